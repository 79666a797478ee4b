pub mod layout;
pub mod settings;

pub use layout::MediaLayout;
pub use settings::Settings;
