//! Risk Assessment Gateway
//!
//! Ad-hoc risk queries for a point, a batch of points, a feature or a batch of
//! features. The input shape is decided once, up front, and the answer has the
//! same shape: scalar in, scalar out; batch in, batch out.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::fanout::join_all_ordered;
use shared::types::{Coordinate, CoordinateError, GeoFeature, RiskScore};
use std::sync::Arc;

use crate::collaborators::RiskScorer;
use crate::error::RiskError;

#[derive(Debug, Clone, PartialEq)]
pub enum RiskInput {
    SingleCoordinate(Coordinate),
    CoordinateBatch(Vec<Coordinate>),
    SingleFeature(GeoFeature),
    FeatureBatch(Vec<GeoFeature>),
}

impl RiskInput {
    /// Classify a raw JSON value.
    ///
    /// Checked in order: an array starting with a number is one coordinate, an
    /// array starting with an array is a coordinate batch, an object is one
    /// feature, an array starting with an object is a feature batch. Every
    /// element of a batch must match its batch kind.
    pub fn classify(input: &Value) -> Result<Self, RiskError> {
        match input {
            Value::Array(items) => match items.first() {
                Some(Value::Number(_)) => parse_coordinate(input).map(RiskInput::SingleCoordinate),
                Some(Value::Array(_)) => items
                    .iter()
                    .map(parse_coordinate)
                    .collect::<Result<Vec<_>, _>>()
                    .map(RiskInput::CoordinateBatch),
                Some(Value::Object(_)) => items
                    .iter()
                    .map(parse_feature)
                    .collect::<Result<Vec<_>, _>>()
                    .map(RiskInput::FeatureBatch),
                _ => Err(RiskError::UnexpectedInputFormat),
            },
            Value::Object(_) => parse_feature(input).map(RiskInput::SingleFeature),
            _ => Err(RiskError::UnexpectedInputFormat),
        }
    }
}

fn parse_coordinate(value: &Value) -> Result<Coordinate, RiskError> {
    let pair = <[f64; 2]>::deserialize(value).map_err(|_| RiskError::UnexpectedInputFormat)?;
    Ok(Coordinate::try_from(pair)?)
}

fn parse_feature(value: &Value) -> Result<GeoFeature, RiskError> {
    let Value::Object(fields) = value else {
        return Err(RiskError::UnexpectedInputFormat);
    };

    GeoFeature::from_map(fields.clone()).map_err(|e| match e {
        CoordinateError::MissingPoint => RiskError::UnexpectedInputFormat,
        other => RiskError::InvalidCoordinate(other),
    })
}

/// Mirrors the shape of [`RiskInput`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RiskOutput {
    Score(RiskScore),
    Scores(Vec<RiskScore>),
    Feature(GeoFeature),
    Features(Vec<GeoFeature>),
}

#[derive(Clone)]
pub struct RiskGateway {
    scorer: Arc<dyn RiskScorer>,
}

impl RiskGateway {
    pub fn new(scorer: Arc<dyn RiskScorer>) -> Self {
        Self { scorer }
    }

    pub async fn assess(&self, input: RiskInput) -> Result<RiskOutput, RiskError> {
        let scorer = self.scorer.as_ref();

        match input {
            RiskInput::SingleCoordinate(c) => scorer.score_coordinate(c).await.map(RiskOutput::Score),
            RiskInput::CoordinateBatch(coordinates) => {
                join_all_ordered(coordinates.into_iter().map(|c| scorer.score_coordinate(c)))
                    .await
                    .map(RiskOutput::Scores)
            }
            RiskInput::SingleFeature(feature) => {
                scorer.decorate_feature(feature).await.map(RiskOutput::Feature)
            }
            RiskInput::FeatureBatch(features) => {
                join_all_ordered(features.into_iter().map(|f| scorer.decorate_feature(f)))
                    .await
                    .map(RiskOutput::Features)
            }
        }
    }

    pub async fn assess_json(&self, input: &Value) -> Result<RiskOutput, RiskError> {
        let input = RiskInput::classify(input)?;
        self.assess(input).await
    }
}
