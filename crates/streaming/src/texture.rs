/// Opaque handle to a decoded texture owned by the rendering collaborator.
///
/// The cache never inspects texture contents; it only keys and hands back
/// these handles, so the handle stays a small copyable id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u64);
