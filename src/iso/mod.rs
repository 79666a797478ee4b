pub mod boot;
pub mod label;
pub mod packager;

pub use boot::{patch_config_file, Bootloader, KICKSTART_ARG};
pub use label::{blkid_invocation, parse_blkid_label};
pub use packager::{isohybrid_invocation, mkisofs_invocation};
