// Post classification through a hosted language model.
//
// The ContentGenerator trait is the seam: VertexClient streams replies from
// Vertex AI, and `classifier` turns one streamed reply into an
// InferenceResult. Swapping providers means another ContentGenerator,
// nothing else.

pub mod classifier;
pub mod sse;
pub mod traits;
pub mod vertex;
