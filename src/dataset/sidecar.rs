//! The `data.yaml` sidecar that describes a YOLO dataset.
//!
//! The file is copied to the output untouched. We only look inside it for
//! the class list, so that labels with unknown class ids can be reported.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::TilerError;

/// File name of the sidecar at the dataset root.
pub const DATA_YAML: &str = "data.yaml";

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

/// Copy `input_root/data.yaml` to `output_root/data.yaml`.
///
/// Returns `false` if the input has no sidecar.
pub fn copy_data_yaml(input_root: &Path, output_root: &Path) -> Result<bool, TilerError> {
    let source = input_root.join(DATA_YAML);
    if !source.is_file() {
        return Ok(false);
    }

    fs::create_dir_all(output_root).map_err(TilerError::Io)?;
    fs::copy(&source, output_root.join(DATA_YAML)).map_err(TilerError::Io)?;
    Ok(true)
}

/// Number of classes declared by a `data.yaml`.
///
/// `names` may be a list or an index mapping. Gaps in a mapping count as
/// classes too, so a mapping declares its max index plus one.
pub fn read_class_count(path: &Path) -> Result<usize, TilerError> {
    let data = fs::read_to_string(path).map_err(|source| TilerError::DataYamlRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_class_count(&data).map_err(|source| TilerError::DataYamlParse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_class_count(data: &str) -> Result<usize, serde_yaml::Error> {
    let parsed: DataYaml = serde_yaml::from_str(data)?;

    let count = match parsed.names {
        DataYamlNames::Sequence(names) => names.len(),
        DataYamlNames::Mapping(mapping) => mapping
            .keys()
            .max()
            .map_or(0, |max_index| max_index.saturating_add(1)),
    };

    Ok(count)
}
