//! End-to-end tests: session files on disk through to GeoJSON

#[cfg(test)]
mod tests {
    use beaconmap_core::demo::DemoSession;
    use beaconmap_core::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_demo_session_from_directory() {
        let dir = TempDir::new().unwrap();
        let text = DemoSession::new(11)
            .beacons(3)
            .samples_per_beacon(200)
            .dropout_every(20)
            .generate();
        fs::write(dir.path().join("demo.csv"), text).unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.list().unwrap(), vec!["demo.csv".to_string()]);

        let mut config = MapConfig::default();
        config.ingest.chunk_size = 64;
        config.display.max_points_per_beacon = 50;
        let mut ctl = MapController::new(config, source, GeoJsonSurface::new());

        let state = ctl.load("demo.csv").await.unwrap();
        assert!(matches!(
            state,
            LoadState::Finalized {
                beacons: 3,
                rows: 600,
                ..
            }
        ));

        let session = ctl.session().unwrap();
        assert_eq!(session.rows_received(), 600);
        for id in ["B01", "B02", "B03"] {
            assert_eq!(session.series(id).unwrap().len(), 200);
            let markers = ctl.surface().markers(id);
            assert!(!markers.is_empty() && markers.len() <= 50);
            assert!(markers.iter().all(|m| m.position[1].is_finite()));
        }
        assert_eq!(
            ctl.surface().status(),
            Some(&StatusMessage::LoadedLimited { max_points: 50 })
        );

        let doc = ctl.surface().to_feature_collection();
        assert_eq!(doc["type"], "FeatureCollection");
        assert_eq!(doc["bbox"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_directory_rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let mut ctl = MapController::new(
            MapConfig::default(),
            DirectorySource::new(dir.path()),
            GeoJsonSurface::new(),
        );

        let result = ctl.load("../secret.csv").await;
        assert!(matches!(
            result,
            Err(MapError::Fetch(FetchError::InvalidName(_)))
        ));
        assert!(matches!(
            ctl.surface().status(),
            Some(StatusMessage::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_config_file_drives_controller() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("beaconmap.json");
        fs::write(
            &config_path,
            r##"{
                "ingest": { "header_lines": 0 },
                "display": { "palette": ["#ff0000"], "thresholds": { "low": 0, "high": 100 } }
            }"##,
        )
        .unwrap();
        let config = MapConfig::load(&config_path).unwrap();

        let source = MemorySource::new().with_session(
            "plain.csv",
            "beacon_id,latitude,longitude,data\nA,1.0,2.0,50\nB,1.5,2.5,100\n",
        );
        let mut ctl = MapController::new(config, source, GeoJsonSurface::new());
        ctl.load("plain.csv").await.unwrap();

        let red = Rgb::new(255, 0, 0);
        assert_eq!(ctl.session().unwrap().layer("B").unwrap().color, red);
        assert_eq!(ctl.surface().markers("A")[0].fill, Rgb::new(128, 0, 0));
        assert_eq!(ctl.surface().markers("B")[0].fill, red);
    }
}
