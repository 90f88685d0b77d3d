use std::{fs::File, io::{self, Cursor, Read, Seek}, path::{Path, PathBuf}, time::Duration};

use anyhow::{Context, Result};
use zip::ZipArchive;

use crate::{
    common::{ensure_dir_exists, fetch_bytes, write_bytes_atomic},
    error::AdmError,
    geom::{read_from_shapefile, BoundaryCollection},
};

use super::{select_layer, BoundarySource, LayerPolicy, ADMIN_DEPTH, COUNTRY};

const NAME: &str = "gadm";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Files that make up one shapefile layer.
const SIDECAR_EXTENSIONS: [&str; 5] = ["shp", "shx", "dbf", "prj", "cpg"];

/// GADM 4.1 country package: one zip holding a shapefile layer per depth.
#[derive(Debug, Clone)]
pub struct Gadm {
    archive_url: String,
    work_dir: PathBuf,
    layer_policy: LayerPolicy,
}

impl Gadm {
    /// Source that keeps the downloaded archive in `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>, layer_policy: LayerPolicy) -> Self {
        Self {
            archive_url: format!("https://geodata.ucdavis.edu/gadm/gadm4.1/shp/gadm41_{COUNTRY}_shp.zip"),
            work_dir: work_dir.into(),
            layer_policy,
        }
    }

    /// Use a different archive location.
    pub fn with_archive_url(mut self, archive_url: impl Into<String>) -> Self {
        self.archive_url = archive_url.into();
        self
    }

    fn archive_path(&self) -> PathBuf {
        let file_name = self.archive_url.rsplit('/').next()
            .filter(|name| !name.is_empty())
            .unwrap_or("gadm_shp.zip");
        self.work_dir.join(file_name)
    }
}

impl BoundarySource for Gadm {
    fn name(&self) -> &'static str { NAME }

    fn fetch(&self) -> Result<BoundaryCollection> {
        ensure_dir_exists(&self.work_dir)?;

        // ~100MB in a single request
        tracing::info!(url = %self.archive_url, "downloading GADM archive (~100MB)");
        let bytes = fetch_bytes(&self.archive_url, DOWNLOAD_TIMEOUT)
            .map_err(|e| AdmError::unavailable_from(NAME, e))?;

        let archive_path = self.archive_path();
        write_bytes_atomic(&archive_path, &bytes)?;
        tracing::info!(path = %archive_path.display(), bytes = bytes.len(), "saved GADM archive");

        read_layer_from_archive(Cursor::new(bytes), ADMIN_DEPTH, self.layer_policy)
    }
}

/// Layer names (file stems) of every `.shp` entry, in archive order.
pub fn list_shapefile_layers<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let mut layers = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)
            .with_context(|| format!("[gadm] Failed to read archive entry {i}"))?;
        let shp = split_entry_name(entry.name()).filter(|(_, ext)| ext.eq_ignore_ascii_case("shp"));
        if let Some((stem, _)) = shp {
            layers.push(stem.to_string());
        }
    }
    Ok(layers)
}

/// Select the layer for `depth` from a shapefile zip and read it.
pub fn read_layer_from_archive<R: Read + Seek>(
    reader: R,
    depth: u8,
    policy: LayerPolicy,
) -> Result<BoundaryCollection> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| AdmError::unavailable(NAME, format!("not a zip archive: {e}")))?;

    let layers = list_shapefile_layers(&mut archive).map_err(|e| AdmError::unavailable_from(NAME, e))?;
    tracing::debug!(?layers, "archive layers");

    let (layer, strategy) = select_layer(&layers, depth, policy).ok_or_else(|| AdmError::unavailable(
        NAME, format!("no layer for admin depth {depth} among {layers:?}"),
    ))?;
    tracing::info!(layer, ?strategy, "selected layer");

    let dir = tempfile::tempdir()
        .context("[gadm] Failed to create scratch directory")
        .map_err(|e| AdmError::unavailable_from(NAME, e))?;
    let shp_path = extract_layer(&mut archive, layer, dir.path())
        .map_err(|e| AdmError::unavailable_from(NAME, e))?;
    read_from_shapefile(&shp_path).map_err(|e| AdmError::unavailable_from(NAME, e).into())
}

/// Copy the layer's sidecar files into `dest` as `{layer}.{ext}`; returns the `.shp` path.
fn extract_layer<R: Read + Seek>(archive: &mut ZipArchive<R>, layer: &str, dest: &Path) -> Result<PathBuf> {
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)
            .with_context(|| format!("[gadm] Failed to read archive entry {i}"))?;
        let Some((stem, ext)) = split_entry_name(entry.name()) else { continue };
        let ext = ext.to_ascii_lowercase();
        if stem != layer || !SIDECAR_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }

        let out_path = dest.join(format!("{layer}.{ext}"));
        let mut out = File::create(&out_path)
            .with_context(|| format!("[gadm] Failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("[gadm] Failed to extract {}", out_path.display()))?;
    }

    let shp_path = dest.join(format!("{layer}.shp"));
    if !shp_path.exists() {
        anyhow::bail!("[gadm] layer {layer} has no .shp file");
    }
    Ok(shp_path)
}

/// Split an archive entry path into (file stem, extension), skipping directories.
fn split_entry_name(name: &str) -> Option<(&str, &str)> {
    let file_name = name.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    (!stem.is_empty()).then_some((stem, ext))
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use shapefile::{
        dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
        Point, Polygon, PolygonRing, Writer,
    };
    use zip::{write::FileOptions, CompressionMethod, ZipWriter};

    use crate::common::fixture::{serve, Route};

    use super::*;

    const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    fn zip_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> = FileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, bytes) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(bytes).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn archive(names: &[&str]) -> Vec<u8> {
        let entries: Vec<(&str, &[u8])> = names.iter().map(|name| (*name, b"placeholder".as_slice())).collect();
        zip_entries(&entries)
    }

    /// A GADM-like archive: a placeholder country layer plus a real one-polygon depth-3 layer.
    fn layer_archive() -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let shp_path = dir.path().join("gadm41_IND_3.shp");

        let field = |name: &str| FieldName::try_from(name).unwrap();
        let table = TableWriterBuilder::new()
            .add_character_field(field("NAME_1"), 40)
            .add_character_field(field("NAME_2"), 40)
            .add_character_field(field("NAME_3"), 40);
        {
            let mut writer = Writer::from_path(&shp_path, table).unwrap();
            // clockwise outer ring
            let polygon = Polygon::new(PolygonRing::Outer(vec![
                Point::new(73.9, 15.5),
                Point::new(73.9, 15.7),
                Point::new(74.0, 15.7),
                Point::new(74.0, 15.5),
                Point::new(73.9, 15.5),
            ]));
            let mut record = Record::default();
            record.insert("NAME_1".into(), FieldValue::Character(Some("Goa".into())));
            record.insert("NAME_2".into(), FieldValue::Character(Some("North Goa".into())));
            record.insert("NAME_3".into(), FieldValue::Character(Some("Bicholim".into())));
            writer.write_shape_and_record(&polygon, &record).unwrap();
        }

        let read = |ext: &str| fs::read(shp_path.with_extension(ext)).unwrap();
        let (shp, shx, dbf) = (read("shp"), read("shx"), read("dbf"));
        zip_entries(&[
            ("gadm41_IND_0.shp", b"placeholder".as_slice()),
            ("gadm41_IND_3.shp", shp.as_slice()),
            ("gadm41_IND_3.shx", shx.as_slice()),
            ("gadm41_IND_3.dbf", dbf.as_slice()),
            ("gadm41_IND_3.prj", WGS84_PRJ.as_bytes()),
        ])
    }

    fn assert_bicholim(collection: &BoundaryCollection) {
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.epsg(), crate::geom::WGS84);
        assert_eq!(collection.columns(), ["NAME_1", "NAME_2", "NAME_3"]);

        let feature = &collection.features()[0];
        assert_eq!(feature.property("NAME_1"), Some("Goa"));
        assert_eq!(feature.property("NAME_2"), Some("North Goa"));
        assert_eq!(feature.property("NAME_3"), Some("Bicholim"));
        assert_eq!(feature.geometry.0.len(), 1);
    }

    #[test]
    fn lists_shapefile_layers_in_archive_order() {
        let bytes = archive(&[
            "license.txt",
            "gadm41_IND_0.shp", "gadm41_IND_0.dbf",
            "gadm41_IND_1.SHP",
            "nested/gadm41_IND_3.shp", "nested/gadm41_IND_3.prj",
            "gadm41_IND_2.shp",
        ]);
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            list_shapefile_layers(&mut zip).unwrap(),
            vec!["gadm41_IND_0", "gadm41_IND_1", "gadm41_IND_3", "gadm41_IND_2"],
        );
    }

    #[test]
    fn extracts_only_the_selected_layer() {
        let bytes = archive(&[
            "gadm41_IND_2.shp", "gadm41_IND_2.dbf",
            "gadm41_IND_3.shp", "gadm41_IND_3.shx", "gadm41_IND_3.DBF", "gadm41_IND_3.prj",
            "gadm41_IND_3.xml",
        ]);
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let shp = extract_layer(&mut zip, "gadm41_IND_3", dir.path()).unwrap();
        assert_eq!(shp, dir.path().join("gadm41_IND_3.shp"));

        let mut names: Vec<String> = std::fs::read_dir(dir.path()).unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["gadm41_IND_3.dbf", "gadm41_IND_3.prj", "gadm41_IND_3.shp", "gadm41_IND_3.shx"]);
    }

    #[test]
    fn reads_names_and_crs_from_depth_layer() {
        let collection = read_layer_from_archive(Cursor::new(layer_archive()), 3, LayerPolicy::Strict).unwrap();
        assert_bicholim(&collection);
    }

    #[test]
    fn unreadable_layer_is_source_unavailable() {
        // selected layer has a .shp entry that is not a shapefile
        let bytes = archive(&["gadm41_IND_3.shp", "gadm41_IND_3.dbf"]);
        let err = read_layer_from_archive(Cursor::new(bytes), 3, LayerPolicy::Strict).unwrap_err();
        assert!(matches!(err.downcast_ref::<AdmError>(), Some(AdmError::SourceUnavailable { provider: "gadm", .. })));
    }

    #[test]
    fn missing_depth_layer_is_source_unavailable() {
        let bytes = archive(&["country.shp", "states.shp"]);
        let err = read_layer_from_archive(Cursor::new(bytes), 3, LayerPolicy::Strict).unwrap_err();
        assert!(matches!(err.downcast_ref::<AdmError>(), Some(AdmError::SourceUnavailable { provider: "gadm", .. })));
    }

    #[test]
    fn garbage_bytes_are_source_unavailable() {
        let err = read_layer_from_archive(Cursor::new(b"not a zip".to_vec()), 3, LayerPolicy::Strict).unwrap_err();
        assert!(err.downcast_ref::<AdmError>().is_some());
    }

    #[test]
    fn archive_path_follows_url_file_name() {
        let gadm = Gadm::new("work", LayerPolicy::Strict);
        assert_eq!(gadm.archive_path(), Path::new("work").join("gadm41_IND_shp.zip"));
    }

    #[test]
    fn fetch_downloads_saves_and_reads_archive() {
        let base = serve(vec![Route::ok("/gadm/gadm41_IND_shp.zip", layer_archive())]);
        let work = tempfile::tempdir().unwrap();

        let source = Gadm::new(work.path(), LayerPolicy::Strict)
            .with_archive_url(format!("{base}/gadm/gadm41_IND_shp.zip"));
        let collection = source.fetch().unwrap();

        assert_bicholim(&collection);
        assert!(work.path().join("gadm41_IND_shp.zip").is_file());
    }

    #[test]
    fn failed_download_is_source_unavailable() {
        let base = serve(vec![Route::status("/gadm/gadm41_IND_shp.zip", 503)]);
        let work = tempfile::tempdir().unwrap();

        let source = Gadm::new(work.path(), LayerPolicy::Strict)
            .with_archive_url(format!("{base}/gadm/gadm41_IND_shp.zip"));
        let err = source.fetch().unwrap_err();

        assert!(matches!(err.downcast_ref::<AdmError>(), Some(AdmError::SourceUnavailable { provider: "gadm", .. })));
        assert!(!work.path().join("gadm41_IND_shp.zip").exists());
    }
}
