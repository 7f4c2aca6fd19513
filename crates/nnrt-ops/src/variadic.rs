//! Builders whose arity isn't a single fixed number: `Concat` (N inputs, one
//! output), `Split` (one input, N outputs), and `Lstm` (an optional bias
//! input and an optional cell-state output). Each does its own range check
//! rather than going through `BuilderCore::validate_entry`'s exact-arity path.

use nnrt_core::{
    validation::{validate_disjoint, validate_index_bounds, validate_max_count},
    BuilderCore, NnrtResult, NnrtStatus, OperatorBuilder, OperatorType, Primitive, QuantMode, Tensor,
};

fn reject_if_built(core: &BuilderCore) -> NnrtResult<()> {
    if core.is_built() {
        log::error!("Build failed, operator already built.");
        return Err(NnrtStatus::OperationForbidden);
    }
    Ok(())
}

#[derive(Default)]
pub struct ConcatBuilder {
    core: BuilderCore,
}

impl OperatorBuilder for ConcatBuilder {
    fn op_type(&self) -> OperatorType {
        OperatorType::Concat
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        reject_if_built(&self.core)?;
        if inputs.len() < 2 {
            log::error!("Concat::build: requires at least 2 inputs, got {}.", inputs.len());
            return Err(NnrtStatus::InvalidParameter);
        }
        if outputs.len() != 1 {
            log::error!("Concat::build: requires exactly 1 output, got {}.", outputs.len());
            return Err(NnrtStatus::InvalidParameter);
        }
        validate_index_bounds(inputs, all_tensors.len())?;
        validate_index_bounds(outputs, all_tensors.len())?;
        validate_index_bounds(params, all_tensors.len())?;
        validate_max_count(params.len(), 1, "params")?;
        validate_disjoint(inputs, outputs)?;
        self.core.finish("Concat", inputs, outputs, all_tensors);
        Ok(())
    }

    fn get_primitive(&self) -> Option<Primitive> {
        self.core.is_built().then(|| Primitive::new(self.op_type(), Vec::new()))
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

#[derive(Default)]
pub struct SplitBuilder {
    core: BuilderCore,
}

impl OperatorBuilder for SplitBuilder {
    fn op_type(&self) -> OperatorType {
        OperatorType::Split
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        reject_if_built(&self.core)?;
        if inputs.len() != 1 {
            log::error!("Split::build: requires exactly 1 input, got {}.", inputs.len());
            return Err(NnrtStatus::InvalidParameter);
        }
        if outputs.len() < 2 {
            log::error!("Split::build: requires at least 2 outputs, got {}.", outputs.len());
            return Err(NnrtStatus::InvalidParameter);
        }
        validate_index_bounds(inputs, all_tensors.len())?;
        validate_index_bounds(outputs, all_tensors.len())?;
        validate_index_bounds(params, all_tensors.len())?;
        validate_max_count(params.len(), 2, "params")?;
        validate_disjoint(inputs, outputs)?;
        self.core.finish("Split", inputs, outputs, all_tensors);
        Ok(())
    }

    fn get_primitive(&self) -> Option<Primitive> {
        self.core.is_built().then(|| Primitive::new(self.op_type(), Vec::new()))
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

/// `x, h0, c0, w_ih, w_hh` with an optional trailing bias input; `output, hn`
/// with an optional trailing cell-state output.
#[derive(Default)]
pub struct LstmBuilder {
    core: BuilderCore,
}

impl OperatorBuilder for LstmBuilder {
    fn op_type(&self) -> OperatorType {
        OperatorType::Lstm
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        reject_if_built(&self.core)?;
        if !(5..=6).contains(&inputs.len()) {
            log::error!("Lstm::build: expected 5 or 6 inputs, got {}.", inputs.len());
            return Err(NnrtStatus::InvalidParameter);
        }
        if !(2..=3).contains(&outputs.len()) {
            log::error!("Lstm::build: expected 2 or 3 outputs, got {}.", outputs.len());
            return Err(NnrtStatus::InvalidParameter);
        }
        validate_index_bounds(inputs, all_tensors.len())?;
        validate_index_bounds(outputs, all_tensors.len())?;
        validate_index_bounds(params, all_tensors.len())?;
        validate_max_count(params.len(), 10, "params")?;
        validate_disjoint(inputs, outputs)?;
        self.core.finish("Lstm", inputs, outputs, all_tensors);
        Ok(())
    }

    fn get_primitive(&self) -> Option<Primitive> {
        self.core.is_built().then(|| Primitive::new(self.op_type(), Vec::new()))
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

    fn tensors(n: usize) -> Vec<Tensor> {
        (0..n)
            .map(|_| Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::Tensor))
            .collect()
    }

    #[test]
    fn concat_requires_at_least_two_inputs() {
        let t = tensors(3);
        let mut b = ConcatBuilder::default();
        assert_eq!(b.build(&[], &[0], &[2], &t), Err(NnrtStatus::InvalidParameter));
        assert!(b.build(&[], &[0, 1], &[2], &t).is_ok());
    }

    #[test]
    fn split_requires_at_least_two_outputs() {
        let t = tensors(3);
        let mut b = SplitBuilder::default();
        assert_eq!(b.build(&[], &[0], &[1], &t), Err(NnrtStatus::InvalidParameter));
        assert!(b.build(&[], &[0], &[1, 2], &t).is_ok());
    }

    #[test]
    fn lstm_accepts_with_or_without_bias_and_cell_output() {
        let t = tensors(8);
        let mut b = LstmBuilder::default();
        assert!(b.build(&[], &[0, 1, 2, 3, 4], &[6, 7], &t).is_ok());

        let t2 = tensors(9);
        let mut b2 = LstmBuilder::default();
        assert!(b2.build(&[], &[0, 1, 2, 3, 4, 5], &[6, 7, 8], &t2).is_ok());
    }
}
