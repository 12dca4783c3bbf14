//! Endpoint-specific API implementations
//!
//! Each module is thin path/verb glue: one method issues exactly one call
//! through the client pipeline and hands back its [`ApiResponse`] unchanged.
//!
//! ## Mapping to backend resources
//!
//! | Module | Base path | Operations |
//! |--------|-----------|------------|
//! | `auth` | `/auth` | register, login, refresh-token, logout |
//! | `recipes` | `/recipe` | list (filtered), get, by user, create, update, delete |
//! | `categories` | `/category` | list |
//! | `videos` | `/video` | create, update, delete (multipart allowed) |
//! | `profiles` | `/profile` | update |
//! | `likers` | `/liker` | list (filtered), by user, create, delete |
//! | `bookmarks` | `/bookmark` | list (filtered), by user, create, delete |
//!
//! [`ApiResponse`]: crate::request::ApiResponse

pub mod auth;
pub mod bookmarks;
pub mod categories;
pub mod likers;
pub mod profiles;
pub mod recipes;
pub mod videos;

pub use auth::AuthApi;
pub use bookmarks::BookmarksApi;
pub use categories::CategoriesApi;
pub use likers::LikersApi;
pub use profiles::ProfilesApi;
pub use recipes::{RecipeFilter, RecipesApi};
pub use videos::VideosApi;

/// `{base}/{id}`
pub(crate) fn item_path(base: &str, id: impl std::fmt::Display) -> String {
    format!("{base}/{id}")
}

/// `{base}/user/{user_id}`
pub(crate) fn user_path(base: &str, user_id: impl std::fmt::Display) -> String {
    format!("{base}/user/{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(item_path("/recipe", 42), "/recipe/42");
        assert_eq!(item_path("/video", "abc"), "/video/abc");
        assert_eq!(user_path("/bookmark", "u1"), "/bookmark/user/u1");
    }
}
