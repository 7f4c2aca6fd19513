//! `SimpleBuilder`: the shared shape for every operator whose contract is
//! "fixed input/output arity, a bounded parameter count, no extra semantics
//! captured beyond that" — the large majority of this runtime's operators.
//! Concrete arities are wired up per `OperatorType` in `register_all`.

use nnrt_core::{BuilderCore, NnrtResult, OperatorBuilder, OperatorType, Primitive, QuantMode, Tensor};

#[derive(Debug, Clone)]
pub struct SimpleBuilder {
    op_type: OperatorType,
    in_arity: usize,
    out_arity: usize,
    max_params: usize,
    core: BuilderCore,
}

impl SimpleBuilder {
    pub fn new(op_type: OperatorType, in_arity: usize, out_arity: usize, max_params: usize) -> Self {
        SimpleBuilder {
            op_type,
            in_arity,
            out_arity,
            max_params,
            core: BuilderCore::new(),
        }
    }
}

impl OperatorBuilder for SimpleBuilder {
    fn op_type(&self) -> OperatorType {
        self.op_type
    }

    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()> {
        self.core
            .validate_entry(params, inputs, outputs, all_tensors, self.in_arity, self.out_arity, self.max_params)?;
        self.core.finish(format!("{:?}", self.op_type), inputs, outputs, all_tensors);
        Ok(())
    }

    fn get_primitive(&self) -> Option<Primitive> {
        self.core.is_built().then(|| Primitive::new(self.op_type, Vec::new()))
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
    use nnrt_core::{DataType, NnrtStatus, TensorDesc, TensorRole};

    fn tensors(n: usize) -> Vec<Tensor> {
        (0..n)
            .map(|_| Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::Tensor))
            .collect()
    }

    #[test]
    fn binary_op_requires_two_inputs() {
        let tensors = tensors(3);
        let mut b = SimpleBuilder::new(OperatorType::Add, 2, 1, 0);
        assert_eq!(b.build(&[], &[0], &[2], &tensors), Err(NnrtStatus::InvalidParameter));
        assert!(b.build(&[], &[0, 1], &[2], &tensors).is_ok());
        assert_eq!(b.name(), "Add");
    }

    #[test]
    fn primitive_carries_the_op_type() {
        let tensors = tensors(2);
        let mut b = SimpleBuilder::new(OperatorType::Relu, 1, 1, 0);
        b.build(&[], &[0], &[1], &tensors).unwrap();
        assert_eq!(b.get_primitive().unwrap().op_type(), OperatorType::Relu);
    }
}
