//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::store::store::TileStore;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct Filestore {
    pub basepath: String,
}

impl Filestore {
    pub fn new<P: AsRef<Path>>(basepath: P) -> Filestore {
        Filestore {
            basepath: basepath.as_ref().display().to_string(),
        }
    }
    pub fn fullpath(&self, path: &str) -> PathBuf {
        Path::new(&self.basepath).join(path)
    }
}

impl TileStore for Filestore {
    fn info(&self) -> String {
        format!("Tile directory: {}", self.basepath)
    }
    fn read<F>(&self, path: &str, mut read: F) -> bool
    where
        F: FnMut(&mut dyn Read),
    {
        let fullpath = self.fullpath(path);
        debug!("Filestore.read {}", fullpath.display());
        match File::open(&fullpath) {
            Ok(mut f) => {
                read(&mut f);
                true
            }
            Err(_e) => false,
        }
    }
    fn write(&self, path: &str, obj: &[u8]) -> Result<(), io::Error> {
        let fullpath = self.fullpath(path);
        debug!("Filestore.write {}", fullpath.display());
        if let Some(parent) = fullpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut f = File::create(&fullpath)?;
        f.write_all(obj)
    }
    fn exists(&self, path: &str) -> bool {
        self.fullpath(path).exists()
    }
    fn remove_all(&self) -> Result<(), io::Error> {
        let base = Path::new(&self.basepath);
        if base.exists() {
            info!("Removing old files in {}", self.basepath);
            fs::remove_dir_all(base)?;
        }
        Ok(())
    }
}
