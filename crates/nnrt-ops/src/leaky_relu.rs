//! `LeakyRelu`: like `Relu`, but its negative-slope coefficient is consumed
//! from an `OpParameter` tensor and packed into the primitive payload as a
//! single little-endian `f32`, the same convention `Clip` uses for its bounds.

use nnrt_core::{
    BuilderCore, NnrtResult, NnrtStatus, OperatorBuilder, OperatorType, Primitive, QuantMode, Tensor,
};

#[derive(Default)]
pub struct LeakyReluBuilder {
    core: BuilderCore,
    payload: Vec<u8>,
}

impl OperatorBuilder for LeakyReluBuilder {
    fn op_type(&self) -> OperatorType {
        OperatorType::LeakyRelu
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        self.core.validate_entry(params, inputs, outputs, all_tensors, 1, 1, 1)?;
        let negative_slope = match params.first() {
            Some(&idx) => {
                let buf = all_tensors[idx].buffer().ok_or_else(|| {
                    log::error!("LeakyRelu::build: negative_slope tensor has no buffer set.");
                    NnrtStatus::InvalidParameter
                })?;
                if buf.len() != 4 {
                    log::error!("LeakyRelu::build: negative_slope must be a single f32.");
                    return Err(NnrtStatus::InvalidParameter);
                }
                f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
            }
            None => 0.01,
        };
        self.payload = negative_slope.to_le_bytes().to_vec();
        self.core.finish("LeakyRelu", inputs, outputs, all_tensors);
        Ok(())
    }

    fn get_primitive(&self) -> Option<Primitive> {
        self.core.is_built().then(|| Primitive::new(self.op_type(), self.payload.clone()))
    }

    fn name(&self) -> &str {
        self.core.name()
    }
    fn inputs(&self) -> &[usize] {
        self.core.inputs()
    }
    fn outputs(&self) -> &[usize] {
        self.core.outputs()
    }
    fn quant_type(&self) -> QuantMode {
        self.core.quant_type()
    }
    fn is_built(&self) -> bool {
        self.core.is_built()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnrt_core::{DataType, TensorDesc, TensorRole};

    #[test]
    fn defaults_negative_slope_when_no_param_given() {
        let tensors = vec![
            Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::Tensor),
            Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::Tensor),
        ];
        let mut b = LeakyReluBuilder::default();
        b.build(&[], &[0], &[1], &tensors).unwrap();
        let payload = b.get_primitive().unwrap().payload().to_vec();
        assert_eq!(f32::from_le_bytes(payload.try_into().unwrap()), 0.01);
    }

    #[test]
    fn reads_negative_slope_from_param_tensor() {
        let mut slope = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
        slope.set_buffer(0.2f32.to_le_bytes().to_vec()).unwrap();
        let tensors = vec![
            Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::Tensor),
            Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::Tensor),
            slope,
        ];
        let mut b = LeakyReluBuilder::default();
        b.build(&[2], &[0], &[1], &tensors).unwrap();
        let payload = b.get_primitive().unwrap().payload().to_vec();
        assert_eq!(f32::from_le_bytes(payload.try_into().unwrap()), 0.2);
    }
}
