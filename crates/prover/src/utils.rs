use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

/// Wrapper to read JSON file.
pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::IoReadWrite {
        source,
        path: path.into(),
    })?;
    serde_json::from_slice(&bytes).map_err(|source| Error::JsonReadWrite {
        source,
        path: path.into(),
    })
}

/// Serialize the provided type to pretty JSON and write to the given path.
pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Error> {
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| Error::JsonReadWrite {
        source,
        path: path.into(),
    })?;
    std::fs::write(path, bytes).map_err(|source| Error::IoReadWrite {
        source,
        path: path.into(),
    })
}
