//! Browser binding over `web_sys`

mod card;
mod dom;
mod mount;

pub use card::DomCard;
pub use dom::{DomPlayback, DomTarget};
pub use mount::{MountedCarousel, WebSpawner, mount};
