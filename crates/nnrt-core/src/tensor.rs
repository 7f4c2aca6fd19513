//! Tensor: a descriptor plus a one-shot buffer, a role tag, and quantization.

use crate::error::{NnrtResult, NnrtStatus};
use crate::tensor_desc::{DataType, ElementCount, Format, TensorDesc};
use serde::{Deserialize, Serialize};

/// Whether a tensor is an ordinary graph value or a compile-time operator attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TensorRole {
    /// An ordinary value flowing through the graph.
    Tensor,
    /// A compile-time constant consumed as an operator attribute; never emitted
    /// into the lowered `LiteGraph`.
    OpParameter,
}

/// Per-channel quantization parameters, aligned with the tensor's last axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizationParam {
    pub num_bits: u32,
    pub scale: f64,
    pub zero_point: i32,
}

/// A buffer-carrying value, typed by a `TensorDesc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    desc: TensorDesc,
    role: TensorRole,
    buffer: Option<Vec<u8>>,
    quant_params: Vec<QuantizationParam>,
    /// One-shot lock: quantization may not be changed after first compilation.
    compiled: bool,
}

impl Tensor {
    pub fn new(desc: TensorDesc, role: TensorRole) -> Self {
        Tensor {
            desc,
            role,
            buffer: None,
            quant_params: Vec::new(),
            compiled: false,
        }
    }

    pub fn desc(&self) -> &TensorDesc {
        &self.desc
    }

    pub fn desc_mut(&mut self) -> &mut TensorDesc {
        &mut self.desc
    }

    pub fn role(&self) -> TensorRole {
        self.role
    }

    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    pub fn is_quantized(&self) -> bool {
        !self.quant_params.is_empty()
    }

    pub fn quant_params(&self) -> &[QuantizationParam] {
        &self.quant_params
    }

    /// Marks this tensor as having passed through compilation, locking
    /// quantization edits.
    pub fn mark_compiled(&mut self) {
        self.compiled = true;
    }

    /// One-shot: rejected if a buffer is already set, if `data.len()` doesn't match
    /// the descriptor's static byte size, or if the descriptor has a dynamic shape
    /// (buffers may not be bound to dynamic-shaped tensors at graph-build time).
    pub fn set_buffer(&mut self, data: Vec<u8>) -> NnrtResult<()> {
        if self.buffer.is_some() {
            log::error!("Tensor::set_buffer failed, buffer already set.");
            return Err(NnrtStatus::InvalidParameter);
        }
        if matches!(self.desc.get_element_num()?, ElementCount::Dynamic) {
            log::error!("Tensor::set_buffer failed, tensor has a dynamic shape.");
            return Err(NnrtStatus::InvalidParameter);
        }
        let expected = self.desc.get_byte_size()?;
        if data.len() != expected {
            log::error!(
                "Tensor::set_buffer failed, length {} does not match byte size {}.",
                data.len(),
                expected
            );
            return Err(NnrtStatus::InvalidParameter);
        }
        self.buffer = Some(data);
        Ok(())
    }

    /// Sets per-channel quantization parameters. Rejected once the tensor has been
    /// through compilation.
    pub fn set_quant_params(&mut self, params: Vec<QuantizationParam>) -> NnrtResult<()> {
        if self.compiled {
            log::error!("Tensor::set_quant_params failed, tensor already compiled.");
            return Err(NnrtStatus::OperationForbidden);
        }
        self.quant_params = params;
        Ok(())
    }

    /// Re-validates buffer capacity for a (possibly new, for dynamic shapes) shape
    /// and applies it. Used by the execution driver to reconcile dynamic outputs.
    pub fn set_dimensions(&mut self, dims: Vec<i32>) -> NnrtResult<()> {
        self.desc.set_shape(dims)?;
        if let Some(buf) = &self.buffer {
            if matches!(self.desc.get_element_num()?, ElementCount::Known(_)) {
                let expected = self.desc.get_byte_size()?;
                if buf.len() < expected {
                    log::error!(
                        "Tensor::set_dimensions failed, buffer capacity {} insufficient for {}.",
                        buf.len(),
                        expected
                    );
                    return Err(NnrtStatus::InvalidParameter);
                }
            }
        }
        Ok(())
    }
}

/// A shallow, non-owning view of a tensor passed across the backend boundary.
#[derive(Debug, Clone)]
pub struct IoTensor {
    pub name: Option<String>,
    pub data_type: DataType,
    pub format: Format,
    pub dimensions: Vec<i32>,
    pub data: Vec<u8>,
}

impl Tensor {
    /// Shallow-copies name, dtype, format, dims, and the buffer's bytes into an
    /// `IoTensor` view, without transferring buffer ownership away from `self`.
    pub fn convert_to_io_tensor(&self) -> IoTensor {
        IoTensor {
            name: self.desc.name().map(|s| s.to_string()),
            data_type: self.desc.data_type(),
            format: self.desc.format(),
            dimensions: self.desc.shape().to_vec(),
            data: self.buffer.clone().unwrap_or_default(),
        }
    }
}
