//! Throw-away fake `/sys` and `/dev` trees for tests
use crate::system::SystemRoot;
use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A temporary root, removed on drop.
pub struct FakeRoot {
    path: PathBuf,
    root: SystemRoot,
}

impl FakeRoot {
    pub fn new() -> Self {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("ev3sys-test-{}-{}", process::id(), n));
        let sys = path.join("sys");
        let dev = path.join("dev");
        fs::create_dir_all(sys.join("class")).unwrap();
        fs::create_dir_all(&dev).unwrap();
        Self {
            root: SystemRoot::new(sys, dev),
            path,
        }
    }

    pub fn root(&self) -> &SystemRoot {
        &self.root
    }

    /// Create `<sys>/class/<class>/<name>` with the given attributes.
    pub fn device(&self, class: &str, name: &str, attrs: &[(&str, &str)]) -> PathBuf {
        let dir = self.root.class_dir(class).join(name);
        fs::create_dir_all(&dir).unwrap();
        for (attr, value) in attrs {
            write(&dir.join(attr), value);
        }
        dir
    }

    /// Create an arbitrary file below the sys root.
    pub fn sys_file(&self, rel: &str, value: &str) -> PathBuf {
        let path = self.root.sys().join(rel);
        write(&path, value);
        path
    }

    /// Create an arbitrary file below the dev root.
    pub fn dev_file(&self, rel: &str, value: &[u8]) -> PathBuf {
        let path = self.root.dev().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, value).unwrap();
        path
    }

    /// Create an executable shell script named `name`, outside both roots.
    pub fn program(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path.join("bin").join(name);
        write(&path, &format!("#!/bin/sh\n{}", body));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

impl Drop for FakeRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn write(path: &Path, value: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("{}\n", value)).unwrap();
}

/// Read an attribute back, trimmed.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap().trim().to_owned()
}
