pub mod engagement;
pub mod follow;
pub mod pagination;
pub mod posts;
pub mod ranking;
pub mod search;
pub mod tags;

pub use engagement::{EngagementCommand, EngagementOutcome, EngagementService};
pub use follow::{FollowChange, FollowService};
pub use pagination::{paginate, PageMeta, DEFAULT_PAGE_SIZE};
pub use posts::{NewPost, PostFilter, PostPatch, PostService};
pub use ranking::SortMode;
pub use tags::{top_tags, TagCount};
