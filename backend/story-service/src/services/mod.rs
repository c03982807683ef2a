/// Business logic layer for story-service
///
/// - Story access controller: ownership and visibility decisions for every
///   story operation, on top of the `StoryStore` trait.
pub mod stories;

pub use stories::{StoryAccess, StoryAccessController};
