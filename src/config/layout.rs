use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Fixed locations the media plans read from and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLayout {
    /// Operator home; holds the ansible tree, kickstarts and the vmedia image.
    pub home: PathBuf,
    /// Where the USB key or vmedia image is mounted.
    pub mount_point: PathBuf,
    /// Where the source installer ISO is loop-mounted.
    pub iso_mount: PathBuf,
    /// Scratch root for the unpacked ISO tree and the authored ISO.
    pub work_dir: PathBuf,
    pub image_name: String,
    pub image_size_mib: u32,
    pub iso_name: String,
    pub iso_tree_name: String,
    pub sah_kickstart: String,
    pub csah_kickstart: String,
}

impl MediaLayout {
    pub fn detect() -> Result<Self> {
        let home = home::home_dir()
            .ok_or_else(|| anyhow!("Could not determine the home directory"))?;
        Ok(Self::for_home(home))
    }

    pub fn for_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            mount_point: PathBuf::from("/mnt/usb"),
            iso_mount: PathBuf::from("/mnt"),
            work_dir: PathBuf::from("/home"),
            image_name: "ocp_ks.img".to_string(),
            image_size_mib: 10000,
            iso_name: "ocp_csah_dvd.iso".to_string(),
            iso_tree_name: "rhel8".to_string(),
            sah_kickstart: "ocp-sah.ks".to_string(),
            csah_kickstart: "ocp-csah.ks".to_string(),
        }
    }

    pub fn ansible_dir(&self) -> PathBuf {
        self.home.join("ansible")
    }

    /// Hardware inventory copied next to the ansible tree on the medium.
    pub fn inventory_file(&self) -> PathBuf {
        self.ansible_dir()
            .join("JetPack")
            .join("src")
            .join("pilot")
            .join("dell_systems.json")
    }

    pub fn pilot_dir_on_media(&self) -> PathBuf {
        self.mount_point.join("ansible").join("pilot")
    }

    pub fn default_kickstart_template(&self) -> PathBuf {
        self.inventory_file().with_file_name("ocp-sah.ks.hbs")
    }

    pub fn kickstart_outputs(&self) -> Vec<PathBuf> {
        vec![
            self.home.join(&self.sah_kickstart),
            self.home.join(&self.csah_kickstart),
        ]
    }

    pub fn iso_tree(&self) -> PathBuf {
        self.work_dir.join(&self.iso_tree_name)
    }

    pub fn output_iso(&self) -> PathBuf {
        self.work_dir.join(&self.iso_name)
    }

    pub fn isolinux_cfg(&self) -> PathBuf {
        self.iso_tree().join("isolinux").join("isolinux.cfg")
    }

    pub fn grub_cfg(&self) -> PathBuf {
        self.iso_tree().join("EFI").join("BOOT").join("grub.cfg")
    }
}
