//! `Clip`: clamps its input elementwise between two scalar bounds. The bounds
//! arrive as `OpParameter` tensors (consumed here, never emitted into the
//! lowered graph) and are packed into the primitive payload as two
//! little-endian `f32`s (min then max) — the one payload convention this
//! runtime defines, since backends have no other way to recover a consumed
//! parameter's value.

use nnrt_core::{
    BuilderCore, NnrtResult, NnrtStatus, OperatorBuilder, OperatorType, Primitive, QuantMode, Tensor,
};

#[derive(Default)]
pub struct ClipBuilder {
    core: BuilderCore,
    payload: Vec<u8>,
}

fn read_scalar_f32(tensor: &Tensor) -> NnrtResult<f32> {
    let buf = tensor.buffer().ok_or_else(|| {
        log::error!("Clip::build: bound tensor has no buffer set.");
        NnrtStatus::InvalidParameter
    })?;
    if buf.len() != 4 {
        log::error!("Clip::build: bound tensor must be a single f32.");
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

impl OperatorBuilder for ClipBuilder {
    fn op_type(&self) -> OperatorType {
        OperatorType::Clip
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        self.core.validate_entry(params, inputs, outputs, all_tensors, 1, 1, 2)?;
        let min = read_scalar_f32(&all_tensors[params[0]])?;
        let max = read_scalar_f32(&all_tensors[params[1]])?;
        if min > max {
            log::error!("Clip::build: min {} exceeds max {}.", min, max);
            return Err(NnrtStatus::InvalidParameter);
        }
        self.payload = [min.to_le_bytes(), max.to_le_bytes()].concat();
        self.core.finish("Clip", inputs, outputs, all_tensors);
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

    fn make_tensors() -> Vec<Tensor> {
        let x = Tensor::new(TensorDesc::new(DataType::Float32, vec![4]).unwrap(), TensorRole::Tensor);
        let y = Tensor::new(TensorDesc::new(DataType::Float32, vec![4]).unwrap(), TensorRole::Tensor);
        let mut min_t = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
        min_t.set_buffer(0.0f32.to_le_bytes().to_vec()).unwrap();
        let mut max_t = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
        max_t.set_buffer(6.0f32.to_le_bytes().to_vec()).unwrap();
        vec![x, y, min_t, max_t]
    }

    #[test]
    fn payload_packs_min_then_max() {
        let tensors = make_tensors();
        let mut b = ClipBuilder::default();
        b.build(&[2, 3], &[0], &[1], &tensors).unwrap();
        let primitive = b.get_primitive().unwrap();
        let payload = primitive.payload();
        assert_eq!(f32::from_le_bytes(payload[0..4].try_into().unwrap()), 0.0);
        assert_eq!(f32::from_le_bytes(payload[4..8].try_into().unwrap()), 6.0);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut tensors = make_tensors();
        let mut min_t = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
        min_t.set_buffer(10.0f32.to_le_bytes().to_vec()).unwrap();
        tensors[2] = min_t;
        let mut b = ClipBuilder::default();
        assert_eq!(
            b.build(&[2, 3], &[0], &[1], &tensors),
            Err(NnrtStatus::InvalidParameter)
        );
    }
}
