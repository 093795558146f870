mod batch;
mod pool;

pub use batch::BatchHandle;
pub use pool::ThumbnailOptimizer;
