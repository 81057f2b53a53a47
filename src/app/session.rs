//! Interactive menu loop
//!
//! Reads one answer per line. `E` at the menu or the continue prompt ends
//! the session, and so does end of input. Invalid parameters re-prompt;
//! every other error ends the session and is returned to the caller.

use std::io::{BufRead, Write};

use crate::app::validate::{parse_index, parse_option, parse_year, resolve_state};
use crate::app::{EMPTY_RESULT_MESSAGE, OutputFormat, QueryRequest, execute};
use crate::error::{Result, is_out_of_range};
use crate::query::{ChronicDiseaseParams, QueryEngine};
use crate::store::lookup::{Dataset, YearRange};

const RULE: &str =
    "**********************************************************************************";

const OPTIONS: [&str; 7] = [
    "Get the leading cause of death for each state during a given year.",
    "Get the percent of people with no physical activity for states where \n\t\t   more than 35% of the population is overweight for a given year.",
    "Get the percent of people with no physical activity for states \n\t\t   where heart disease is the leading cause of death for a given year.",
    "Explore Chronic Disease Indicators by year, state, and topic.",
    "Explore Nutrition dataset by year, state, and topic.",
    "Get the leading causes of deaths (and their rates) for states where\n\t\t   more than 30% of people have no physical activity.",
    "Get drug poisoning statistics for a given year and state.",
];

/// An interactive session over any line reader and writer
pub struct Session<'e, R, W> {
    engine: &'e QueryEngine,
    input: R,
    output: W,
    format: OutputFormat,
    closed: bool,
}

impl<'e, R: BufRead, W: Write> Session<'e, R, W> {
    pub fn new(engine: &'e QueryEngine, input: R, output: W, format: OutputFormat) -> Self {
        Self {
            engine,
            input,
            output,
            format,
            closed: false,
        }
    }

    /// Give back the writer, e.g. to inspect a scripted session
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu until the user ends it or input runs out
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "\n\n\t{RULE}")?;
        writeln!(
            self.output,
            "\t\tWelcome to the Data Exploration Application for four NCHS datasets!"
        )?;

        loop {
            writeln!(self.output, "\t{RULE}")?;
            self.print_options()?;
            let Some(choice) = self.prompt(
                "\n\tPlease enter the number for to the discovery option you would like to run (or enter 'E' to end): ",
            )?
            else {
                break;
            };
            if choice.eq_ignore_ascii_case("e") {
                break;
            }

            let option = match parse_option(&choice) {
                Ok(option) => option,
                Err(_) => {
                    writeln!(self.output, "\n\t'{choice}' was not a valid choice.")?;
                    continue;
                }
            };

            if let Some(request) = self.build_request(option)? {
                self.run_request(&request)?;
            }
            if self.closed {
                break;
            }

            let answer = self
                .prompt("\n\tEnter 'E' if you would like to end. (Enter anything else to continue): ")?;
            writeln!(self.output)?;
            match answer {
                Some(answer) if !answer.eq_ignore_ascii_case("e") => {}
                _ => break,
            }
        }

        writeln!(self.output, "\n\tProgram Ended.")?;
        writeln!(self.output, "\t{RULE}")?;
        self.output.flush()?;
        Ok(())
    }

    fn print_options(&mut self) -> Result<()> {
        writeln!(self.output, "\n\tThe following discovery options are available: \n")?;
        for (i, option) in OPTIONS.iter().enumerate() {
            writeln!(self.output, "\t\t{}. {option}", i + 1)?;
        }
        Ok(())
    }

    fn run_request(&mut self, request: &QueryRequest) -> Result<()> {
        writeln!(self.output, "\n\t{request}\n")?;
        let rendered = execute(self.engine, request, self.format)?;
        for line in rendered.lines() {
            writeln!(self.output, "\t{line}")?;
        }
        Ok(())
    }

    /// Write `text` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.closed = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt until `parse` accepts the answer
    fn ask<T>(
        &mut self,
        text: &str,
        retry: &str,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<Option<T>> {
        while let Some(answer) = self.prompt(text)? {
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) if is_out_of_range(&e) => writeln!(self.output, "\t{retry}")?,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    fn choose_year(&mut self, heading: &str, range: Option<YearRange>) -> Result<Option<i32>> {
        let Some(range) = range else {
            writeln!(self.output, "\t{EMPTY_RESULT_MESSAGE}")?;
            return Ok(None);
        };
        writeln!(self.output, "\n\t{heading}")?;
        let text = format!("\tEnter a year value in the range {range}: ");
        self.ask(&text, "Invalid year. Try Again.", |input| {
            parse_year(input, Some(range))
        })
    }

    fn choose_state(&mut self, dataset: Dataset) -> Result<Option<String>> {
        let states = self.engine.states_for(dataset)?;
        self.ask(
            "\n\tEnter a state (full name): ",
            "Invalid State. Try Again.",
            |input| resolve_state(input, &states),
        )
    }

    fn choose_from(&mut self, noun: &str, labels: &[String]) -> Result<Option<usize>> {
        writeln!(self.output)?;
        for (i, label) in labels.iter().enumerate() {
            writeln!(self.output, "\t{i}. {label}")?;
        }
        let text = format!("\n\tChoose one of the {noun}s above, and enter the corresponding number: ");
        self.ask(&text, "Invalid choice. Try Again.", |input| {
            parse_index(input, labels.len(), noun)
        })
    }

    /// Pick a topic, then one of its questions; returns the `QuestionID`
    fn choose_question(&mut self, dataset: Dataset) -> Result<Option<String>> {
        let topics = self.engine.topics_for(dataset)?;
        if topics.is_empty() {
            writeln!(self.output, "\t{EMPTY_RESULT_MESSAGE}")?;
            return Ok(None);
        }
        let labels: Vec<String> = topics.iter().map(|(_, topic)| topic.clone()).collect();
        let Some(topic) = self.choose_from("topic", &labels)? else {
            return Ok(None);
        };

        let questions = self.engine.questions_for(&topics[topic].0, dataset)?;
        if questions.is_empty() {
            writeln!(self.output, "\t{EMPTY_RESULT_MESSAGE}")?;
            return Ok(None);
        }
        let labels: Vec<String> = questions.iter().map(|(question, _)| question.clone()).collect();
        let Some(question) = self.choose_from("question", &labels)? else {
            return Ok(None);
        };
        Ok(Some(questions[question].1.clone()))
    }

    /// Collect the parameters of menu `option`; `None` when the user could
    /// not supply them
    fn build_request(&mut self, option: u8) -> Result<Option<QueryRequest>> {
        let engine = self.engine;
        writeln!(self.output, "\n\t{}", OPTIONS[usize::from(option - 1)])?;

        let request = match option {
            1 => self
                .choose_year("Choose a year.", engine.leading_cause_year_range()?)?
                .map(|year| QueryRequest::LeadingCause { year }),
            2 => self
                .choose_year("Choose a year.", engine.nutrition_year_range()?)?
                .map(|year| QueryRequest::OverweightInactivity { year }),
            3 => self
                .choose_year("Choose a year.", engine.shared_year_range()?)?
                .map(|year| QueryRequest::HeartDiseaseInactivity { year }),
            4 => {
                let ranges = engine.chronic_disease_year_ranges()?;
                let Some(year_start) =
                    self.choose_year("Choose a start year.", ranges.map(|r| r.0))?
                else {
                    return Ok(None);
                };
                let Some(year_end) = self.choose_year("Choose an end year.", ranges.map(|r| r.1))?
                else {
                    return Ok(None);
                };
                let Some(state) = self.choose_state(Dataset::ChronicDiseaseIndicator)? else {
                    return Ok(None);
                };
                self.choose_question(Dataset::ChronicDiseaseIndicator)?
                    .map(|question_id| {
                        QueryRequest::ChronicDisease(ChronicDiseaseParams {
                            year_start,
                            year_end,
                            state,
                            question_id,
                        })
                    })
            }
            5 => {
                let Some(year) = self.choose_year("Choose a year.", engine.nutrition_year_range()?)?
                else {
                    return Ok(None);
                };
                let Some(state) = self.choose_state(Dataset::Nutrition)? else {
                    return Ok(None);
                };
                self.choose_question(Dataset::Nutrition)?
                    .map(|question_id| QueryRequest::NutritionStratified {
                        year,
                        state,
                        question_id,
                    })
            }
            6 => self
                .choose_year("Choose a year.", engine.shared_year_range()?)?
                .map(|year| QueryRequest::InactivityCauses { year }),
            _ => {
                let Some(year) =
                    self.choose_year("Choose a year.", engine.drug_poisoning_year_range())?
                else {
                    return Ok(None);
                };
                self.choose_state(Dataset::DrugPoisoning)?
                    .map(|state| QueryRequest::DrugPoisoning { year, state })
            }
        };
        Ok(request)
    }
}
