//! `LayerNorm`: the one shape-relational builder in this crate. Beyond the
//! ordinary arity/index checks, it validates that `gamma`/`beta`'s shape
//! matches the input's shape from `begin_norm_axis` onward, dimension by
//! dimension — a rank check alone isn't enough (§8 scenario 5).
//!
//! `begin_norm_axis` and `epsilon` arrive as `OpParameter` tensors and are
//! packed into the primitive payload as a little-endian `i32` then `f32`,
//! the same consumed-parameter convention `Clip` uses.

use nnrt_core::{
    BuilderCore, NnrtResult, NnrtStatus, OperatorBuilder, OperatorType, Primitive, QuantMode, Tensor,
};

#[derive(Default)]
pub struct LayerNormBuilder {
    core: BuilderCore,
    payload: Vec<u8>,
}

fn read_scalar_i32(tensor: &Tensor) -> NnrtResult<i32> {
    let buf = tensor.buffer().ok_or_else(|| {
        log::error!("LayerNorm::build: begin_norm_axis tensor has no buffer set.");
        NnrtStatus::InvalidParameter
    })?;
    if buf.len() != 4 {
        log::error!("LayerNorm::build: begin_norm_axis must be a single i32.");
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

fn read_scalar_f32(tensor: &Tensor) -> NnrtResult<f32> {
    let buf = tensor.buffer().ok_or_else(|| {
        log::error!("LayerNorm::build: epsilon tensor has no buffer set.");
        NnrtStatus::InvalidParameter
    })?;
    if buf.len() != 4 {
        log::error!("LayerNorm::build: epsilon must be a single f32.");
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Validates that `candidate`'s shape equals `input_shape[begin_norm_axis..]`
/// exactly, axis by axis.
fn validate_tail_shape(what: &str, input_shape: &[i32], begin_norm_axis: usize, candidate: &[i32]) -> NnrtResult<()> {
    let expected = &input_shape[begin_norm_axis..];
    if candidate != expected {
        log::error!(
            "LayerNorm::build: {} shape {:?} does not match input tail {:?} from begin_norm_axis.",
            what,
            candidate,
            expected
        );
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(())
}

impl OperatorBuilder for LayerNormBuilder {
    fn op_type(&self) -> OperatorType {
        OperatorType::LayerNorm
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        self.core.validate_entry(params, inputs, outputs, all_tensors, 3, 1, 3)?;

        let input_shape = all_tensors[inputs[0]].desc().shape().to_vec();
        let rank = input_shape.len();

        let begin_norm_axis = if params.is_empty() {
            0
        } else {
            read_scalar_i32(&all_tensors[params[0]])?
        };
        if begin_norm_axis < 0 || begin_norm_axis as usize >= rank {
            log::error!(
                "LayerNorm::build: begin_norm_axis {} out of range for rank {}.",
                begin_norm_axis,
                rank
            );
            return Err(NnrtStatus::InvalidParameter);
        }
        let begin_norm_axis = begin_norm_axis as usize;

        let epsilon = if params.len() >= 2 {
            read_scalar_f32(&all_tensors[params[1]])?
        } else {
            1e-5
        };

        let gamma_shape = all_tensors[inputs[1]].desc().shape();
        let beta_shape = all_tensors[inputs[2]].desc().shape();
        validate_tail_shape("gamma", &input_shape, begin_norm_axis, gamma_shape)?;
        validate_tail_shape("beta", &input_shape, begin_norm_axis, beta_shape)?;

        self.payload = [(begin_norm_axis as i32).to_le_bytes(), epsilon.to_le_bytes()].concat();
        self.core.finish("LayerNorm", inputs, outputs, all_tensors);
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

    fn tensor(shape: Vec<i32>) -> Tensor {
        Tensor::new(TensorDesc::new(DataType::Float32, shape).unwrap(), TensorRole::Tensor)
    }

    fn param_i32(value: i32) -> Tensor {
        let mut t = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
        t.set_buffer(value.to_le_bytes().to_vec()).unwrap();
        t
    }

    fn param_f32(value: f32) -> Tensor {
        let mut t = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
        t.set_buffer(value.to_le_bytes().to_vec()).unwrap();
        t
    }

    #[test]
    fn accepts_gamma_beta_matching_input_tail_shape() {
        let tensors = vec![
            tensor(vec![2, 3, 4]),
            tensor(vec![3, 4]),
            tensor(vec![3, 4]),
            tensor(vec![2, 3, 4]),
            param_i32(1),
            param_f32(1e-5),
        ];
        let mut b = LayerNormBuilder::default();
        assert!(b.build(&[4, 5], &[0, 1, 2], &[3], &tensors).is_ok());
    }

    /// §8 scenario 5: input `[2,3,4]`, `begin_norm_axis=1`, gamma `[3]` (must
    /// be `[3,4]`) fails `INVALID_PARAMETER`.
    #[test]
    fn rejects_gamma_shape_not_matching_tail() {
        let tensors = vec![
            tensor(vec![2, 3, 4]),
            tensor(vec![3]),
            tensor(vec![3, 4]),
            tensor(vec![2, 3, 4]),
            param_i32(1),
        ];
        let mut b = LayerNormBuilder::default();
        assert_eq!(
            b.build(&[4], &[0, 1, 2], &[3], &tensors),
            Err(NnrtStatus::InvalidParameter)
        );
    }

    #[test]
    fn rejects_begin_norm_axis_out_of_range() {
        let tensors = vec![
            tensor(vec![2, 3, 4]),
            tensor(vec![3, 4]),
            tensor(vec![3, 4]),
            tensor(vec![2, 3, 4]),
            param_i32(5),
        ];
        let mut b = LayerNormBuilder::default();
        assert_eq!(
            b.build(&[4], &[0, 1, 2], &[3], &tensors),
            Err(NnrtStatus::InvalidParameter)
        );
    }
}
