//! Shared fixtures for the integration tests
//!
//! One small, hand-checked world: three states, two survey questions, one
//! chronic disease question and a handful of drug poisoning statistics.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use nchs_explorer::config::DEFAULT_DRUG_POISONING_XML;
use nchs_explorer::store::rows::{
    CauseOfDeathRow, CauseRow, ChronicDiseaseRow, DataValueTypeRow, LocationRow, NutritionRow,
    QuestionRow, StratificationRow, TopicRow,
};
use nchs_explorer::{DrugPoisoningDocument, QueryEngine, RelationalStore, Result, Table, TableStore};
use parquet::arrow::ArrowWriter;

pub const OHIO: i32 = 39;
pub const TEXAS: i32 = 48;
pub const UTAH: i32 = 49;

fn death(year: i32, state: &str, cause: &str, deaths: i64, rate: f64) -> CauseOfDeathRow {
    CauseOfDeathRow {
        year,
        cause_name: cause.to_string(),
        state: state.to_string(),
        deaths,
        age_adjusted_death_rate: rate,
    }
}

/// A nutrition stratum for 2015
pub fn survey(
    location_id: i32,
    question_id: &str,
    stratification_id: &str,
    sample_size: i64,
    data_value: f64,
) -> NutritionRow {
    NutritionRow {
        year_start: 2015,
        year_end: 2015,
        data_value_unit: Some("%".to_string()),
        data_value: Some(data_value),
        sample_size: Some(sample_size),
        topic_id: if question_id == "Q037" { "OWS" } else { "PA" }.to_string(),
        data_value_type_id: "VALUE".to_string(),
        stratification_id: stratification_id.to_string(),
        question_id: question_id.to_string(),
        location_id,
    }
}

fn indicator(year_start: i32, year_end: i32, strat: &str, value: Option<&str>) -> ChronicDiseaseRow {
    ChronicDiseaseRow {
        year_start,
        year_end,
        data_value_unit: Some("per 100,000".to_string()),
        data_value: value.map(String::from),
        topic_id: "CAN".to_string(),
        stratification_id: strat.to_string(),
        data_value_type_id: "CRDPREV".to_string(),
        question_id: "CAN4_1".to_string(),
        location_id: OHIO,
    }
}

fn location(id: i32, abbr: &str, desc: &str) -> LocationRow {
    LocationRow {
        location_id: id,
        location_abbr: Some(abbr.to_string()),
        location_desc: desc.to_string(),
    }
}

fn stratum(id: &str, category: &str, label: &str) -> StratificationRow {
    StratificationRow {
        stratification_id: id.to_string(),
        stratification_category_id: Some(category.to_uppercase()),
        stratification: label.to_string(),
        stratification_category: category.to_string(),
    }
}

/// Causes of death for 2015 and one row for 2016
///
/// Ohio and Texas lead with heart disease; Utah ties cancer with heart
/// disease.
pub fn deaths() -> Vec<CauseOfDeathRow> {
    vec![
        death(2015, "Ohio", "Heart disease", 300, 190.5),
        death(2015, "Ohio", "Cancer", 250, 170.2),
        death(2015, "Ohio", "All causes", 900, 700.0),
        death(2015, "Utah", "Cancer", 120, 120.0),
        death(2015, "Utah", "Heart disease", 120, 118.0),
        death(2015, "Utah", "All causes", 400, 510.3),
        death(2015, "Texas", "Heart disease", 500, 170.0),
        death(2015, "Texas", "Stroke", 100, 40.0),
        death(2016, "Ohio", "Heart disease", 310, 188.1),
    ]
}

/// Survey strata for 2015
///
/// Ohio: overweight 40.0, inactivity 30.0. Utah: overweight exactly 35.0,
/// inactivity 31.0. Texas: overweight 36.0 with no inactivity figure.
pub fn surveys() -> Vec<NutritionRow> {
    let mut spanning = survey(OHIO, "Q047", "OVR", 10, 55.5);
    spanning.year_end = 2016;
    vec![
        survey(OHIO, "Q037", "OVR", 100, 40.0),
        survey(OHIO, "Q037", "MALE", 0, -1.0),
        survey(OHIO, "Q047", "MALE", 100, 20.0),
        survey(OHIO, "Q047", "FEMALE", 100, 40.0),
        spanning,
        survey(UTAH, "Q037", "OVR", 100, 35.0),
        survey(UTAH, "Q047", "OVR", 50, 31.0),
        survey(TEXAS, "Q037", "OVR", 200, 36.0),
    ]
}

/// Chronic disease rows for Ohio, in storage order
pub fn indicators() -> Vec<ChronicDiseaseRow> {
    vec![
        indicator(2012, 2014, "OVR", Some("-1")),
        indicator(2012, 2014, "MALE", Some("-1.0")),
        indicator(2012, 2014, "FEMALE", None),
        indicator(2012, 2014, "OVR", Some("45.2")),
        indicator(2012, 2014, "OVR", Some("45.2")),
        indicator(2013, 2013, "OVR", Some("44.0")),
    ]
}

/// Every relational table populated from the fixture rows
pub fn fixture_store() -> Result<TableStore> {
    TableStore::default()
        .with_rows(&deaths())?
        .with_rows(&[
            CauseRow {
                cause_name: "Heart disease".to_string(),
                cause_name_expanded: "Diseases of heart".to_string(),
            },
            CauseRow {
                cause_name: "Cancer".to_string(),
                cause_name_expanded: "Malignant neoplasms".to_string(),
            },
            CauseRow {
                cause_name: "Stroke".to_string(),
                cause_name_expanded: "Cerebrovascular diseases".to_string(),
            },
            CauseRow {
                cause_name: "All causes".to_string(),
                cause_name_expanded: "All causes".to_string(),
            },
        ])?
        .with_rows(&[
            location(OHIO, "OH", "Ohio"),
            location(TEXAS, "TX", "Texas"),
            location(UTAH, "UT", "Utah"),
        ])?
        .with_rows(&[
            TopicRow {
                topic_id: "CAN".to_string(),
                topic: "Cancer".to_string(),
            },
            TopicRow {
                topic_id: "OWS".to_string(),
                topic: "Obesity / Weight Status".to_string(),
            },
            TopicRow {
                topic_id: "PA".to_string(),
                topic: "Physical Activity".to_string(),
            },
        ])?
        .with_rows(&[
            QuestionRow {
                question_id: "CAN4_1".to_string(),
                question: "Invasive cancer (all sites combined), incidence".to_string(),
            },
            QuestionRow {
                question_id: "Q037".to_string(),
                question: "Percent of adults aged 18 years and older who have overweight"
                    .to_string(),
            },
            QuestionRow {
                question_id: "Q047".to_string(),
                question: "Percent of adults who engage in no leisure-time physical activity"
                    .to_string(),
            },
        ])?
        .with_rows(&[
            DataValueTypeRow {
                data_value_type_id: "VALUE".to_string(),
                data_value_type: "Value".to_string(),
            },
            DataValueTypeRow {
                data_value_type_id: "CRDPREV".to_string(),
                data_value_type: "Crude Prevalence".to_string(),
            },
        ])?
        .with_rows(&[
            stratum("OVR", "Total", "Total"),
            stratum("MALE", "Sex", "Male"),
            stratum("FEMALE", "Sex", "Female"),
        ])?
        .with_rows(&surveys())?
        .with_rows(&indicators())
}

fn statistic(year: i32, state: &str, sex: &str, ages: (i32, i32), deaths: i64, population: i64) -> String {
    format!(
        "\t<DrugPoisoningStatistic>
\t\t<Year>{year}</Year>
\t\t<Sex>{sex}</Sex>
\t\t<AgeRange>
\t\t\t<LowerBound>{}</LowerBound>
\t\t\t<UpperBound>{}</UpperBound>
\t\t</AgeRange>
\t\t<Race>All Races-All Origins</Race>
\t\t<State>{state}</State>
\t\t<Deaths>{deaths}</Deaths>
\t\t<Population>{population}</Population>
\t\t<Crude>
\t\t\t<DeathRate>-1</DeathRate>
\t\t\t<Stderr>-1</Stderr>
\t\t\t<LowConfidenceLimit>-1</LowConfidenceLimit>
\t\t\t<UpperConfidenceLimit>-1</UpperConfidenceLimit>
\t\t\t<StateRateLowerBound>-1</StateRateLowerBound>
\t\t\t<StateRateUpperBound>-1</StateRateUpperBound>
\t\t\t<USRate>14.7</USRate>
\t\t</Crude>
\t\t<AgeInfo>
\t\t\t<AdjustedRate>-1</AdjustedRate>
\t\t\t<Stderr>-1</Stderr>
\t\t\t<LowConfidenceLimit>-1</LowConfidenceLimit>
\t\t\t<UpperConfidenceLimit>-1</UpperConfidenceLimit>
\t\t\t<USRate>14.8</USRate>
\t\t</AgeInfo>
\t</DrugPoisoningStatistic>
",
        ages.0, ages.1
    )
}

/// The drug poisoning document as the loader writes it
pub fn drug_poisoning_xml() -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<DrugPoisoning>\n");
    xml.push_str(&statistic(2014, "Ohio", "Male", (25, 34), 1, 3));
    xml.push_str(&statistic(2014, "Ohio", "Female", (15, 24), 50, 1000));
    xml.push_str(&statistic(2014, "Ohio", "Both Sexes", (0, 150), 7, 0));
    xml.push_str(&statistic(2016, "United States", "Both Sexes", (0, 150), 63632, 323_127_513));
    xml.push_str("</DrugPoisoning>\n");
    xml
}

pub fn fixture_document() -> Result<DrugPoisoningDocument> {
    DrugPoisoningDocument::from_xml_str(&drug_poisoning_xml())
}

pub fn fixture_engine() -> Result<QueryEngine> {
    Ok(QueryEngine::new(
        Arc::new(fixture_store()?),
        Arc::new(fixture_document()?),
    ))
}

/// Write batches to a single Parquet file
pub fn write_parquet(path: &Path, batches: &[RecordBatch]) -> Result<()> {
    let Some(first) = batches.first() else {
        return Err(anyhow::anyhow!("nothing to write to {}", path.display()));
    };
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, first.schema(), None)?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;
    Ok(())
}

/// Lay the fixture out on disk the way the loader does: one Parquet file
/// per table plus the XML document
pub fn write_data_dir(dir: &Path) -> Result<()> {
    let store = fixture_store()?;
    for table in Table::ALL {
        let batches = store.scan(table, None)?;
        write_parquet(&dir.join(format!("{}.parquet", table.name())), &batches)?;
    }
    std::fs::write(dir.join(DEFAULT_DRUG_POISONING_XML), drug_poisoning_xml())?;
    Ok(())
}
