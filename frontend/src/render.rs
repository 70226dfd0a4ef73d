use minijinja::{context, Environment};
use serde::Serialize;

use crate::chart::ChartData;
use crate::types::PredictionResult;

pub const DEFAULT_TEXT: &str = "I love everyone and everything";

const INDEX: &str = "index.html";

/// What one page render shows: the form, plus at most one of result or error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Idle,
    Rendered(PredictionResult),
    ErrorShown(String),
}

#[derive(Serialize)]
struct ResultView {
    label: String,
    score: String,
    chart_svg: String,
}

impl ResultView {
    fn new(result: &PredictionResult) -> Self {
        ResultView {
            label: result.label.to_string(),
            score: format!("{:.2}", result.score),
            chart_svg: ChartData::from_result(result).to_svg(),
        }
    }
}

/// Compiled page templates. `.html` templates are auto-escaped.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../templates/index.html"))?;
        Ok(Pages { env })
    }

    pub fn index(&self, text: &str, outcome: &Outcome) -> Result<String, minijinja::Error> {
        let (result, error) = match outcome {
            Outcome::Idle => (None, None),
            Outcome::Rendered(result) => (Some(ResultView::new(result)), None),
            Outcome::ErrorShown(message) => (None, Some(message.as_str())),
        };

        self.env
            .get_template(INDEX)?
            .render(context! { text, result, error })
    }
}
