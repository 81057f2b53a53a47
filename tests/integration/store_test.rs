use std::sync::Arc;

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use nchs_explorer::store::encode_rows;
use nchs_explorer::store::lookup::{Dataset, YearRange};
use nchs_explorer::store::rows::LocationRow;
use nchs_explorer::{
    DocumentStore, DrugPoisoningDocument, Error, ExplorerConfig, QueryEngine, RelationalStore,
    Result, Table, TableStore,
};

use crate::utils::{fixture_engine, surveys, write_data_dir, write_parquet};

fn is_store_unavailable(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Error>(),
        Some(Error::StoreUnavailable { .. })
    )
}

/// Both stores open from a data directory laid out by the loader
#[test]
fn test_open_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_data_dir(dir.path())?;
    let config = ExplorerConfig::default().with_data_dir(dir.path());

    let store = TableStore::open(&config)?;
    assert_eq!(store.row_count(Table::Nutrition), surveys().len());
    assert_eq!(store.row_count(Table::Location), 3);

    let document = DrugPoisoningDocument::open(&config.drug_poisoning_xml)?;
    assert_eq!(document.statistics().len(), 4);
    assert_eq!(document.source(), Some(config.drug_poisoning_xml.as_path()));

    // Results from disk match the in-memory fixture
    let from_disk = QueryEngine::new(Arc::new(store), Arc::new(document));
    let in_memory = fixture_engine()?;
    assert_eq!(
        from_disk.leading_cause_of_death(2015)?.rows,
        in_memory.leading_cause_of_death(2015)?.rows
    );
    assert_eq!(
        from_disk.inactivity_and_causes(2015)?.rows,
        in_memory.inactivity_and_causes(2015)?.rows
    );
    Ok(())
}

#[test]
fn test_sequential_load_matches_parallel() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_data_dir(dir.path())?;
    let parallel = ExplorerConfig::default().with_data_dir(dir.path());
    let sequential = ExplorerConfig {
        parallel_load: false,
        ..parallel.clone()
    };

    let a = TableStore::open(&parallel)?;
    let b = TableStore::open(&sequential)?;
    for table in Table::ALL {
        assert_eq!(a.scan(table, None)?, b.scan(table, None)?, "{table}");
    }
    Ok(())
}

#[test]
fn test_missing_table_is_store_unavailable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_data_dir(dir.path())?;
    std::fs::remove_file(dir.path().join("Cause.parquet"))?;

    let config = ExplorerConfig::default().with_data_dir(dir.path());
    let err = TableStore::open(&config).unwrap_err();
    assert!(is_store_unavailable(&err));
    assert!(err.to_string().contains("Cause"));
    Ok(())
}

#[test]
fn test_missing_column_is_store_unavailable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_data_dir(dir.path())?;

    let schema = Arc::new(Schema::new(vec![Field::new(
        "CauseName",
        DataType::Utf8,
        false,
    )]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(StringArray::from(vec!["Heart disease"]))],
    )?;
    write_parquet(&dir.path().join("Cause.parquet"), &[batch])?;

    let config = ExplorerConfig::default().with_data_dir(dir.path());
    let err = TableStore::open(&config).unwrap_err();
    assert!(is_store_unavailable(&err));
    Ok(())
}

#[test]
fn test_missing_data_directory_is_store_unavailable() {
    let config = ExplorerConfig::default().with_data_dir("/nonexistent/nchs");
    assert!(is_store_unavailable(&TableStore::open(&config).unwrap_err()));
}

/// A table may also be a directory of Parquet parts, read in name order
#[test]
fn test_table_as_directory_of_parts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_data_dir(dir.path())?;
    std::fs::remove_file(dir.path().join("Location.parquet"))?;

    let parts = dir.path().join("Location");
    std::fs::create_dir(&parts)?;
    let first = encode_rows(&[LocationRow {
        location_id: 1,
        location_abbr: Some("AL".to_string()),
        location_desc: "Alabama".to_string(),
    }])?;
    let second = encode_rows(&[LocationRow {
        location_id: 2,
        location_abbr: None,
        location_desc: "Alaska".to_string(),
    }])?;
    write_parquet(&parts.join("part-0.parquet"), &[first])?;
    write_parquet(&parts.join("part-1.parquet"), &[second])?;

    let store = TableStore::open(&ExplorerConfig::default().with_data_dir(dir.path()))?;
    let rows: Vec<LocationRow> =
        nchs_explorer::store::scan_rows(&store, None)?;
    let names: Vec<&str> = rows.iter().map(|r| r.location_desc.as_str()).collect();
    assert_eq!(names, vec!["Alabama", "Alaska"]);
    assert_eq!(rows[1].location_abbr, None);
    Ok(())
}

#[test]
fn test_malformed_document_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.xml");
    std::fs::write(&path, "<DrugPoisoning><DrugPoisoningStatistic><Year>x</Year>")?;

    let err = DrugPoisoningDocument::open(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MalformedDocument { .. })
    ));
    Ok(())
}

#[test]
fn test_year_ranges() -> Result<()> {
    let engine = fixture_engine()?;
    assert_eq!(
        engine.leading_cause_year_range()?,
        Some(YearRange::new(2015, 2016))
    );
    assert_eq!(engine.nutrition_year_range()?, Some(YearRange::new(2015, 2015)));
    assert_eq!(
        engine.chronic_disease_year_ranges()?,
        Some((YearRange::new(2012, 2013), YearRange::new(2013, 2014)))
    );
    assert_eq!(
        engine.drug_poisoning_year_range(),
        Some(YearRange::new(2014, 2016))
    );
    assert_eq!(engine.shared_year_range()?, Some(YearRange::new(2015, 2015)));
    Ok(())
}

#[test]
fn test_states_per_dataset() -> Result<()> {
    let engine = fixture_engine()?;
    let list = |dataset| -> Result<Vec<String>> {
        Ok(engine.states_for(dataset)?.into_iter().collect())
    };
    assert_eq!(list(Dataset::LeadingCauseOfDeath)?, vec!["Ohio", "Texas", "Utah"]);
    assert_eq!(list(Dataset::Nutrition)?, vec!["Ohio", "Texas", "Utah"]);
    assert_eq!(list(Dataset::ChronicDiseaseIndicator)?, vec!["Ohio"]);
    assert_eq!(list(Dataset::DrugPoisoning)?, vec!["Ohio", "United States"]);
    Ok(())
}

#[test]
fn test_topics_and_questions() -> Result<()> {
    let engine = fixture_engine()?;

    let topics = engine.topics_for(Dataset::Nutrition)?;
    let ids: Vec<&str> = topics.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["OWS", "PA"]);

    let topics = engine.topics_for(Dataset::ChronicDiseaseIndicator)?;
    assert_eq!(topics, vec![("CAN".to_string(), "Cancer".to_string())]);

    let questions = engine.questions_for("PA", Dataset::Nutrition)?;
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].1, "Q047");
    assert!(engine.questions_for("CAN", Dataset::Nutrition)?.is_empty());
    assert!(engine.topics_for(Dataset::DrugPoisoning)?.is_empty());
    Ok(())
}
