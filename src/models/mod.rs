//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod home;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorInput};
pub use book::{Book, BookDetail, BookInput, BookShort};
pub use book_instance::{BookInstance, InstanceView, LoanStatus, RenewalWindow};
pub use genre::{Genre, Language, NameInput};
pub use home::{CatalogCounts, SessionState};
pub use user::{Permission, UserClaims};
