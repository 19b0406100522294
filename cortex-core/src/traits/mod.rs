pub mod embedding;
pub mod resolver;
pub mod storage;
pub mod tokens;

pub use embedding::IEmbeddingProvider;
pub use resolver::{IPatternResolver, NullResolver, PatternInfo};
pub use storage::{ICausalStorage, IMemoryStorage, IRunStorage, ISessionStorage};
pub use tokens::ITokenEstimator;
