use crate::error::ExportError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write any serializable value as pretty JSON, overwriting `path`.
pub fn export_json<T, P>(value: &T, path: P) -> Result<(), ExportError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResolvedUnit, Unit};

    #[test]
    fn resolved_units_flatten_the_unit_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.json");
        let units = vec![ResolvedUnit {
            unit: Unit::from_unit_number("101", 201, "84A"),
            price: None,
        }];

        export_json(&units, &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value[0]["building_id"], "101");
        assert_eq!(value[0]["unit_number"], 201);
        assert!(value[0]["price"].is_null());

        let back: Vec<ResolvedUnit> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, units);
    }
}
