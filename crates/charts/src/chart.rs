use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use crate::errors::ChartsError;

/// `[timestamp, value]` points in append order
pub type Chart = Vec<[u64; 2]>;

/// loads a chart file, absent or empty files are an empty chart
pub fn load_chart(path: &Path) -> Result<Chart, ChartsError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Chart::new()),
        Err(err) => return Err(ChartsError::io(path, err)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Chart::new());
    }
    serde_json::from_slice(&bytes).map_err(|source| ChartsError::MalformedChart {
        path: path.to_path_buf(),
        source,
    })
}

/// appends one point and persists the whole chart, returns the chart to keep building on
pub fn append_point(
    mut chart: Chart,
    timestamp: u64,
    value: u64,
    path: &Path,
) -> Result<Chart, ChartsError> {
    chart.push([timestamp, value]);
    write_chart(&chart, path)?;
    Ok(chart)
}

pub fn write_chart(chart: &Chart, path: &Path) -> Result<(), ChartsError> {
    let bytes = serde_json::to_vec(chart).map_err(|source| ChartsError::MalformedChart {
        path: path.to_path_buf(),
        source,
    })?;
    write_file_atomic(path, &bytes)
}

/// writes to a sibling temp file and renames it over `path`
pub(crate) fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<(), ChartsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| ChartsError::io(parent, err))?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);
    let mut file = fs::File::create(tmp).map_err(|err| ChartsError::io(tmp, err))?;
    file.write_all(bytes).map_err(|err| ChartsError::io(tmp, err))?;
    file.sync_all().map_err(|err| ChartsError::io(tmp, err))?;
    drop(file);
    fs::rename(tmp, path).map_err(|err| ChartsError::io(path, err))
}
