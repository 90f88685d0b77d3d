use std::fs;

use admcentroid::{
    geom::read_from_geojson_bytes,
    pipeline::{centroid_records, run_convert, ConvertOptions},
    table::{read_table, write_table},
    AdmError, CentroidRecord, NullRowPolicy, SchemaPolicy,
};

/// Three geoBoundaries-style features; the second has no district name.
const GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature",
      "properties": { "ADM1_EN": "Kerala", "ADM2_EN": "Idukki", "ADM3_EN": "Thodupuzha" },
      "geometry": { "type": "Polygon", "coordinates": [[[76.6, 9.8], [76.8, 9.8], [76.8, 10.0], [76.6, 10.0], [76.6, 9.8]]] } },
    { "type": "Feature",
      "properties": { "ADM1_EN": "Goa", "ADM2_EN": null, "ADM3_EN": "Ponda" },
      "geometry": { "type": "Polygon", "coordinates": [[[73.9, 15.3], [74.1, 15.3], [74.1, 15.5], [73.9, 15.5], [73.9, 15.3]]] } },
    { "type": "Feature",
      "properties": { "ADM1_EN": "Goa", "ADM2_EN": "North Goa", "ADM3_EN": "Bicholim" },
      "geometry": { "type": "MultiPolygon", "coordinates": [[[[73.9, 15.5], [74.0, 15.5], [74.0, 15.7], [73.9, 15.7], [73.9, 15.5]]]] } }
  ]
}"#;

fn records() -> Vec<CentroidRecord> {
    let collection = read_from_geojson_bytes(GEOJSON.as_bytes()).unwrap();
    centroid_records(collection, SchemaPolicy::Strict).unwrap()
}

#[test]
fn geojson_to_sorted_table_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("centroids.csv");

    let rows = write_table(&path, &records()).unwrap();
    assert_eq!(rows, 3);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("State,District,Taluka/Tehsil,Latitude,Longitude\n"));

    let mut expected = records();
    expected.sort_by(|a, b| {
        (&a.state, &a.district, &a.subdistrict).cmp(&(&b.state, &b.district, &b.subdistrict))
    });

    let table = read_table(&path).unwrap();
    assert_eq!(table.len(), expected.len());
    for (got, want) in table.iter().zip(&expected) {
        assert_eq!(
            (&got.state, &got.district, &got.subdistrict),
            (&want.state, &want.district, &want.subdistrict),
        );
        assert!((got.latitude - want.latitude).abs() < 1e-12, "{got:?} vs {want:?}");
        assert!((got.longitude - want.longitude).abs() < 1e-12, "{got:?} vs {want:?}");
        assert!((-90.0..=90.0).contains(&got.latitude));
        assert!((-180.0..=180.0).contains(&got.longitude));
    }

    let keys: Vec<&str> = table.iter().map(|r| r.subdistrict.as_str()).collect();
    assert_eq!(keys, vec!["Bicholim", "Ponda", "Thodupuzha"]);
}

#[test]
fn convert_drops_null_rows_and_translates_states() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("centroids.csv");
    let output = dir.path().join("out").join("cities.ts");
    write_table(&input, &records()).unwrap();

    let options = ConvertOptions {
        input,
        output: output.clone(),
        ..ConvertOptions::default()
    };
    assert_eq!(run_convert(&options).unwrap(), 2);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("export const cities: City[] = ["));
    assert!(text.contains(r#"name: "Thodupuzha", nameHindi: "Thodupuzha", state: "Kerala", stateHindi: "केरल""#));
    assert!(text.contains(r#"state: "Goa", stateHindi: "गोवा""#));
    assert!(!text.contains("Ponda"));
}

#[test]
fn convert_fail_policy_reports_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("centroids.csv");
    let output = dir.path().join("cities.ts");
    write_table(&input, &records()).unwrap();

    let options = ConvertOptions {
        input,
        output: output.clone(),
        null_rows: NullRowPolicy::Fail,
        ..ConvertOptions::default()
    };
    let err = run_convert(&options).unwrap_err();
    assert!(matches!(err.downcast_ref::<AdmError>(), Some(AdmError::Configuration(_))));
    assert!(!output.exists());
}

#[test]
fn missing_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cities.ts");
    let options = ConvertOptions {
        input: dir.path().join("absent.csv"),
        output: output.clone(),
        ..ConvertOptions::default()
    };
    assert!(run_convert(&options).is_err());
    assert!(!output.exists());
}

#[test]
fn blank_region_names_are_dropped_by_convert() {
    let geojson = r#"{
      "type": "FeatureCollection",
      "features": [
        { "type": "Feature",
          "properties": { "NAME_1": "Goa", "NAME_2": "  ", "NAME_3": "Bicholim" },
          "geometry": { "type": "Polygon", "coordinates": [[[73.9, 15.5], [74.0, 15.5], [74.0, 15.7], [73.9, 15.5]]] } },
        { "type": "Feature",
          "properties": { "NAME_1": "Kerala", "NAME_2": "Idukki", "NAME_3": "" },
          "geometry": { "type": "Polygon", "coordinates": [[[76.6, 9.8], [76.8, 9.8], [76.8, 10.0], [76.6, 9.8]]] } },
        { "type": "Feature",
          "properties": { "NAME_1": "Goa", "NAME_2": "South Goa", "NAME_3": "Salcete" },
          "geometry": { "type": "Polygon", "coordinates": [[[73.9, 15.2], [74.0, 15.2], [74.0, 15.3], [73.9, 15.2]]] } }
      ]
    }"#;
    let collection = read_from_geojson_bytes(geojson.as_bytes()).unwrap();
    let records = centroid_records(collection, SchemaPolicy::Strict).unwrap();
    assert_eq!(records.iter().filter(|r| r.has_null_marker()).count(), 2);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("centroids.csv");
    let output = dir.path().join("cities.ts");
    write_table(&input, &records).unwrap();

    let options = ConvertOptions {
        input,
        output: output.clone(),
        ..ConvertOptions::default()
    };
    assert_eq!(run_convert(&options).unwrap(), 1);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains(r#"name: "Salcete""#));
    assert!(!text.contains(r#""""#));
    assert!(!text.contains("Bicholim"));
}
