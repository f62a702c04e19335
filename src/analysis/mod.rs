pub mod badges;
pub mod head_to_head;
pub mod profile;
pub mod ranking;
pub mod record;
pub mod streak;
pub mod summary;
