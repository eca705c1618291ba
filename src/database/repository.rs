pub mod games_repository;
pub mod newsletters_repository;
pub mod reviews_repository;
pub mod users_repository;
