//! The opaque per-node IR blob an operator builder emits.
//!
//! The wire format of the underlying operator primitive (MindIR-style) is out of
//! scope for this runtime; a `Primitive` is modeled as an opaque, builder-tagged
//! payload. It is a scoped resource: whatever a builder allocates for it is
//! released when the `Primitive` (or the `LiteGraph` node holding it) is dropped.

use crate::operator::OperatorType;

/// An opaque, builder-produced IR primitive. Released on drop.
#[derive(Debug, Clone)]
pub struct Primitive {
    op_type: OperatorType,
    /// Stand-in for the real backend-specific primitive bytes; this runtime's
    /// core never interprets it, only carries it through to the backend.
    payload: Vec<u8>,
}

impl Primitive {
    pub fn new(op_type: OperatorType, payload: Vec<u8>) -> Self {
        Primitive { op_type, payload }
    }

    pub fn op_type(&self) -> OperatorType {
        self.op_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl Drop for Primitive {
    fn drop(&mut self) {
        log::trace!("releasing primitive for {:?}", self.op_type);
    }
}
