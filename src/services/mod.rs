// Service exports
pub mod cache;
pub mod source;
pub mod supabase;

pub use cache::CachedSource;
pub use source::{CorpusSource, SourceError, StaticSource};
pub use supabase::{SupabaseClient, SupabaseTables};
