//! Background-removal ("cutout") service boundary.
//!
//! Transport, auth and the remote API are the implementor's business; the editor only
//! sees a request carrying PNG bytes and, later, a reply.

/// Correlates a cutout request with its reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CutoutTicket(pub u64);

#[derive(Clone, Debug)]
pub struct CutoutRequest {
    pub ticket: CutoutTicket,
    /// PNG-encoded source image of the target layer.
    pub png: Vec<u8>,
}

/// Reply shape of the relay: `{ success: true, image }` or `{ success: false, message }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CutoutReply {
    Success { image: Vec<u8> },
    Failure { message: String },
}

#[derive(Clone, Debug)]
pub struct CutoutCompletion {
    pub ticket: CutoutTicket,
    pub reply: CutoutReply,
}

pub trait CutoutService {
    fn submit(&mut self, request: CutoutRequest);

    fn poll(&mut self) -> Vec<CutoutCompletion>;

    fn in_flight(&self) -> usize;
}
