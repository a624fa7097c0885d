//! Integration tests for NetCdfReader against synthetic fixtures.

use netcdf_parser::{
    AttributeValue, FormatVersion, NcType, NetCdfError, NetCdfReader, ReaderOptions, VariableData,
};
use test_utils::{
    require_test_file, simple_grid_fixture, time_series_fixture, FixtureValues, FixtureVariable,
    NetCdfFixture,
};

fn numeric(reader: &NetCdfReader, name: &str) -> Vec<f64> {
    reader
        .read_variable(name)
        .unwrap()
        .into_numeric()
        .unwrap_or_else(|| panic!("{} is not numeric", name))
}

#[test]
fn test_header_matches_fixture() {
    let reader = NetCdfReader::new(simple_grid_fixture().build()).unwrap();

    assert_eq!(reader.version(), FormatVersion::Classic);
    assert_eq!(reader.version().name(), "classic format");

    let dims: Vec<(&str, u32)> = reader
        .dimensions()
        .iter()
        .map(|d| (d.name.as_str(), d.size))
        .collect();
    assert_eq!(dims, vec![("lon", 4), ("lat", 3), ("band", 2), ("nchar", 5)]);

    let names: Vec<&str> = reader.variables().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["lon", "lat", "band", "temperature", "interlaced", "source"]
    );

    assert_eq!(
        reader.global_attribute("title"),
        Some(&AttributeValue::Text("simple grid".to_string()))
    );
    assert!(reader.has_global_attribute("Conventions"));
    assert!(!reader.has_global_attribute("history"));
    assert!(reader.record_dimension().id.is_none());

    let temperature = reader.variable("temperature").unwrap();
    assert_eq!(temperature.nc_type, NcType::Short);
    assert_eq!(temperature.dimensions, vec![1, 0]);
    assert_eq!(
        temperature.attribute("_FillValue").map(|a| &a.value),
        Some(&AttributeValue::Number(-999.0))
    );
    // 12 shorts, no padding needed
    assert_eq!(temperature.size, 24);
}

#[test]
fn test_data_offsets_are_aligned() {
    let reader = NetCdfReader::new(simple_grid_fixture().build()).unwrap();
    for variable in reader.variables() {
        assert_eq!(variable.offset % 4, 0, "{} is misaligned", variable.name);
    }
}

#[test]
fn test_non_record_values() {
    let reader = NetCdfReader::new(simple_grid_fixture().build()).unwrap();
    assert_eq!(numeric(&reader, "lon"), vec![0.0, 10.0, 20.0, 30.0]);
    assert_eq!(numeric(&reader, "band"), vec![1.0, 2.0]);

    let temperature = numeric(&reader, "temperature");
    assert_eq!(temperature.len(), 12);
    assert_eq!(temperature[5], -999.0);
}

#[test]
fn test_char_variable_as_string() {
    let reader = NetCdfReader::new(simple_grid_fixture().build()).unwrap();
    // Declared size is padded to 8, but only 5 characters are data
    assert_eq!(reader.read_variable_as_string("source").unwrap(), "model");
    assert!(matches!(
        reader.read_variable("source").unwrap(),
        VariableData::Text(_)
    ));
}

#[test]
fn test_element_counts_for_all_types() {
    let types: Vec<(&str, FixtureValues, FixtureValues)> = vec![
        ("b", vec![1i8, 2, 3].into(), vec![1i8; 6].into()),
        ("c", "abc".into(), "abcdef".into()),
        ("s", vec![1i16, 2, 3].into(), vec![1i16; 6].into()),
        ("i", vec![1i32, 2, 3].into(), vec![1i32; 6].into()),
        ("f", vec![1.0f32, 2.0, 3.0].into(), vec![1.0f32; 6].into()),
        ("d", vec![1.0f64, 2.0, 3.0].into(), vec![1.0f64; 6].into()),
    ];

    let mut fixture = NetCdfFixture::new().unlimited("time", 2).dimension("x", 3);
    for (name, fixed, record) in &types {
        fixture = fixture
            .variable(FixtureVariable::new(&format!("{}_fixed", name), &["x"], fixed.clone()))
            .variable(FixtureVariable::new(
                &format!("{}_record", name),
                &["time", "x"],
                record.clone(),
            ));
    }
    let reader = NetCdfReader::new(fixture.build()).unwrap();
    assert_eq!(reader.record_dimension().length, 2);

    for (name, _, _) in &types {
        let fixed = reader.read_variable(&format!("{}_fixed", name)).unwrap();
        let record = reader.read_variable(&format!("{}_record", name)).unwrap();
        assert_eq!(fixed.len(), 3, "{}_fixed", name);
        assert_eq!(record.len(), 6, "{}_record", name);
        assert!(reader.variable(&format!("{}_record", name)).unwrap().is_record);
    }
}

#[test]
fn test_mixed_width_record_interleave() {
    let fixture = time_series_fixture();
    let reader = NetCdfReader::new(fixture.build()).unwrap();

    assert_eq!(reader.record_dimension().length, 3);
    assert_eq!(reader.record_dimension().name.as_deref(), Some("time"));
    assert_eq!(reader.record_dimension().record_step, fixture.record_step());

    assert_eq!(numeric(&reader, "time"), vec![0.0, 6.0, 12.0]);
    assert_eq!(numeric(&reader, "flag"), vec![1.0, -1.0, 3.0]);
    assert_eq!(
        numeric(&reader, "precip"),
        vec![0.0, 1.0, 2.0, 3.0, 100.0, 101.0, 102.0, 103.0, 200.0, 201.0, 202.0, 203.0]
    );
    // Non-record variables are unaffected by the record section
    assert_eq!(numeric(&reader, "level"), vec![850.0]);
}

#[test]
fn test_byte_as_raw_bytes() {
    let bytes = time_series_fixture().build();
    let reader = NetCdfReader::with_options(
        bytes,
        ReaderOptions {
            byte_as_integer: false,
        },
    )
    .unwrap();
    assert_eq!(
        reader.read_variable("flag").unwrap(),
        VariableData::Raw(vec![1, 0xff, 3])
    );
    // Other types are unaffected
    assert_eq!(numeric(&reader, "time"), vec![0.0, 6.0, 12.0]);
}

#[test]
fn test_offset64_reads_like_classic() {
    let classic = NetCdfReader::new(simple_grid_fixture().build()).unwrap();
    let offset64 = NetCdfReader::new(simple_grid_fixture().offset64().build()).unwrap();

    assert_eq!(offset64.version(), FormatVersion::Offset64);
    assert_eq!(offset64.version().name(), "64-bit offset format");
    for variable in classic.variables() {
        assert_eq!(
            classic.read(variable).unwrap(),
            offset64.read_variable(&variable.name).unwrap()
        );
    }
}

#[test]
fn test_offset64_high_word_rejected() {
    let mut bytes = NetCdfFixture::new()
        .offset64()
        .dimension("x", 1)
        .variable(FixtureVariable::new("v", &["x"], vec![1.0f64]))
        .build();
    // The header ends with the two offset words, followed by 8 data bytes
    let high = bytes.len() - 16;
    bytes[high..high + 4].copy_from_slice(&1u32.to_be_bytes());

    let err = NetCdfReader::new(bytes).unwrap_err();
    assert!(matches!(err, NetCdfError::Unsupported(ref m) if m.contains("4GB")));
}

#[test]
fn test_truncated_stream_fails() {
    let bytes = simple_grid_fixture().build();
    let err = NetCdfReader::new(bytes[..40].to_vec()).unwrap_err();
    assert!(err.is_format_violation());
}

#[test]
fn test_truncated_data_fails_on_read() {
    let mut bytes = simple_grid_fixture().build();
    bytes.truncate(bytes.len() - 4);
    let reader = NetCdfReader::new(bytes).unwrap();
    // The last variable is cut short; earlier ones still read
    assert!(matches!(
        reader.read_variable("source"),
        Err(NetCdfError::OutOfBounds { .. })
    ));
    assert!(reader.read_variable("lon").is_ok());
}

#[test]
fn test_oversized_dimensions_are_out_of_bounds() {
    let mut bytes = NetCdfFixture::new()
        .dimension("a", 2)
        .dimension("b", 2)
        .variable(FixtureVariable::new("v", &["a", "b"], vec![1.0f64, 2.0, 3.0, 4.0]))
        .build();
    // Sizes of "a" and "b" in the dimension list
    bytes[24..28].copy_from_slice(&0x7fff_ffffu32.to_be_bytes());
    bytes[36..40].copy_from_slice(&0x7fff_ffffu32.to_be_bytes());

    let reader = NetCdfReader::new(bytes).unwrap();
    assert_eq!(reader.dimensions()[0].size, 0x7fff_ffff);
    assert!(matches!(
        reader.read_variable("v"),
        Err(NetCdfError::OutOfBounds { .. })
    ));
}

#[test]
fn test_lone_short_record_variable_is_unpadded() {
    let fixture = NetCdfFixture::new()
        .unlimited("time", 3)
        .dimension("x", 3)
        .variable(FixtureVariable::new(
            "flag",
            &["time", "x"],
            vec![1i16, 2, 3, 4, 5, 6, 7, 8, 9],
        ));
    let reader = NetCdfReader::new(fixture.build()).unwrap();

    // Declared size stays padded, the stride does not
    assert_eq!(reader.variable("flag").unwrap().size, 8);
    assert_eq!(reader.record_dimension().record_step, 6);
    assert_eq!(
        numeric(&reader, "flag"),
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
    );
}

#[test]
fn test_unknown_variable() {
    let reader = NetCdfReader::new(simple_grid_fixture().build()).unwrap();
    assert!(!reader.has_variable("salinity"));
    assert_eq!(
        reader.read_variable("salinity").unwrap_err(),
        NetCdfError::VariableNotFound("salinity".to_string())
    );
}

#[test]
fn test_display_summary() {
    let reader = NetCdfReader::new(simple_grid_fixture().build()).unwrap();
    let summary = reader.to_string();

    assert!(summary.starts_with("DIMENSIONS\n"));
    assert!(summary.contains("GLOBAL ATTRIBUTES\n"));
    assert!(summary.contains("VARIABLES:\n"));
    assert!(summary.contains(&format!("  {:<30} = size: 4", "lon")));
    assert!(summary.contains(&format!("  {:<30} = simple grid", "title")));
    assert!(summary.contains("[0.0,10.0,20.0,30.0] (length: 4)"));
    assert!(summary.contains(&format!("  {:<30} = \"model\"", "source")));
}

#[test]
fn test_real_world_file() {
    let path = require_test_file!("sample_classic.nc");
    let bytes = std::fs::read(path).unwrap();
    let reader = NetCdfReader::new(bytes).unwrap();
    for variable in reader.variables() {
        reader.read(variable).unwrap();
    }
}
