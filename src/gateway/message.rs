//! Wire types of the JSON request/response envelope.

use std::path::PathBuf;
use std::str::FromStr;

use nalgebra::{Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::geometry::DomainDescriptor;
use crate::interpolation::PredictedPoint;
use crate::variography::model_variograms::VariogramModelKind;

use super::GatewayError;

/// Corner mismatch tolerated in a four-corner domain before warning.
const CORNER_TOLERANCE: f64 = 1e-6;

pub const SUCCESS_MESSAGE: &str = "Received successfully";

/// `{"action": ..., "args": {...}}`, optionally with a top level `runtimePath`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub action: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub runtime_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionName {
    Test,
    CalculateTopo,
}

impl FromStr for ActionName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEST" => Ok(ActionName::Test),
            "CalculateTopo" => Ok(ActionName::CalculateTopo),
            other => Err(GatewayError::UnsupportedAction(other.to_string())),
        }
    }
}

/// A request resolved to its action and typed arguments.
#[derive(Debug, Clone)]
pub enum Action {
    Test,
    CalculateTopo(CalculateTopoArgs),
}

impl TryFrom<Envelope> for Action {
    type Error = GatewayError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        match envelope.action.parse::<ActionName>()? {
            ActionName::Test => Ok(Action::Test),
            ActionName::CalculateTopo => {
                let mut args = serde_json::from_value::<CalculateTopoArgs>(envelope.args)
                    .map_err(|e| GatewayError::InvalidArguments(e.to_string()))?;
                if args.runtime_path.is_none() {
                    args.runtime_path = envelope.runtime_path;
                }
                Ok(Action::CalculateTopo(args))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTopoArgs {
    pub obb: DomainDto,
    pub points: Vec<PointDto>,
    pub resolution: f64,
    #[serde(default)]
    pub runtime_path: Option<PathBuf>,
    #[serde(default)]
    pub variogram_model: Option<VariogramModelKind>,
    #[serde(default)]
    pub output: OutputShape,
    #[serde(default)]
    pub include_variance: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlanarDto {
    pub x: f64,
    pub y: f64,
}

impl From<PlanarDto> for Point2<f64> {
    fn from(p: PlanarDto) -> Self {
        Point2::new(p.x, p.y)
    }
}

impl From<PlanarDto> for Vector2<f64> {
    fn from(p: PlanarDto) -> Self {
        Vector2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PointDto {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<PointDto> for Point3<f64> {
    fn from(p: PointDto) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

/// The `obb` argument: extents with centroid and axis, four corners or three corners.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DomainDto {
    Axis {
        #[serde(rename = "domainX")]
        domain_x: f64,
        #[serde(rename = "domainY")]
        domain_y: f64,
        centroid: PlanarDto,
        #[serde(rename = "xAxis")]
        x_axis: PlanarDto,
    },
    Corners {
        pts: Vec<PlanarDto>,
    },
    Corner {
        p0: PlanarDto,
        p1: PlanarDto,
        p3: PlanarDto,
    },
}

impl TryFrom<DomainDto> for DomainDescriptor {
    type Error = GatewayError;

    fn try_from(dto: DomainDto) -> Result<Self, Self::Error> {
        match dto {
            DomainDto::Axis {
                domain_x,
                domain_y,
                centroid,
                x_axis,
            } => Ok(DomainDescriptor::Axis {
                domain_x,
                domain_y,
                centroid: centroid.into(),
                x_axis: x_axis.into(),
            }),
            DomainDto::Corners { pts } => {
                let [p0, p1, p2, p3]: [PlanarDto; 4] = pts.try_into().map_err(|pts: Vec<_>| {
                    GatewayError::InvalidArguments(format!(
                        "obb.pts must hold 4 corners, got {}",
                        pts.len()
                    ))
                })?;
                let (p0, p1, p2, p3): (Point2<f64>, Point2<f64>, Point2<f64>, Point2<f64>) =
                    (p0.into(), p1.into(), p2.into(), p3.into());
                let expected = p1 + (p3 - p0);
                let mismatch = nalgebra::distance(&p2, &expected);
                if mismatch > CORNER_TOLERANCE * (1.0 + (p1 - p0).norm().max((p3 - p0).norm())) {
                    warn!(?p2, ?expected, mismatch, "fourth corner does not close the rectangle");
                }
                Ok(DomainDescriptor::Corner { p0, p1, p3 })
            }
            DomainDto::Corner { p0, p1, p3 } => Ok(DomainDescriptor::Corner {
                p0: p0.into(),
                p1: p1.into(),
                p3: p3.into(),
            }),
        }
    }
}

/// Shape of every point in a `CalculateTopo` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// `{"z", "i", "j"}` with z rounded to 3 decimals.
    #[default]
    Grid,
    /// `{"x", "y", "z"}` in global coordinates, unrounded.
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPointDto {
    pub z: f64,
    pub i: usize,
    pub j: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfacePointDto {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputPoint {
    Grid(GridPointDto),
    Surface(SurfacePointDto),
}

impl OutputPoint {
    pub fn from_predicted(point: &PredictedPoint, shape: OutputShape) -> Self {
        match shape {
            OutputShape::Grid => OutputPoint::Grid(GridPointDto {
                z: round3(point.position.z),
                i: point.index.i,
                j: point.index.j,
                variance: point.variance,
            }),
            OutputShape::Points => OutputPoint::Surface(SurfacePointDto {
                x: point.position.x,
                y: point.position.y,
                z: point.position.z,
                variance: point.variance,
            }),
        }
    }
}

pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobResult {
    Test { print: &'static str },
    Topo(TopoJobResult),
}

impl JobResult {
    pub fn test() -> Self {
        JobResult::Test { print: "Test" }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopoJobResult {
    /// Wall time in seconds, rounded to milliseconds.
    pub duration: f64,
    pub count: usize,
    pub max_i: usize,
    pub max_j: usize,
    pub resolution: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<OutputPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_file_path: Option<String>,
}

/// Contents of a persisted result file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultFile<'a> {
    pub points: &'a [OutputPoint],
    pub max_i: usize,
    pub max_j: usize,
    pub resolution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub result: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_result: Option<JobResult>,
}

impl Response {
    pub fn success(data: Value, job_result: JobResult) -> Self {
        Self {
            result: true,
            message: SUCCESS_MESSAGE.to_string(),
            error_kind: None,
            data: Some(data),
            job_result: Some(job_result),
        }
    }

    pub fn failure(error: &GatewayError, data: Option<Value>) -> Self {
        Self {
            result: false,
            message: error.to_string(),
            error_kind: Some(error.kind()),
            data,
            job_result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn action_names() {
        assert_eq!("TEST".parse::<ActionName>().unwrap(), ActionName::Test);
        assert_eq!(
            "CalculateTopo".parse::<ActionName>().unwrap(),
            ActionName::CalculateTopo
        );
        let err = "test".parse::<ActionName>().unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedAction(name) if name == "test"));
    }

    #[test]
    fn test_action_ignores_args() {
        let action = Action::try_from(envelope(json!({"action": "TEST"}))).unwrap();
        assert!(matches!(action, Action::Test));
    }

    #[test]
    fn calculate_topo_axis_form() {
        let action = Action::try_from(envelope(json!({
            "action": "CalculateTopo",
            "args": {
                "obb": {
                    "domainX": 5.0,
                    "domainY": 4.0,
                    "centroid": {"x": 1.0, "y": 2.0, "z": 9.0},
                    "xAxis": {"x": 0.0, "y": 1.0}
                },
                "points": [{"x": 0.0, "y": 0.0, "z": 1.0}],
                "resolution": 0.5
            }
        })))
        .unwrap();
        let Action::CalculateTopo(args) = action else {
            panic!("expected CalculateTopo");
        };
        assert_eq!(args.resolution, 0.5);
        assert_eq!(args.output, OutputShape::Grid);
        assert!(!args.include_variance);
        assert_eq!(args.variogram_model, None);
        assert_eq!(
            DomainDescriptor::try_from(args.obb).unwrap(),
            DomainDescriptor::Axis {
                domain_x: 5.0,
                domain_y: 4.0,
                centroid: Point2::new(1.0, 2.0),
                x_axis: Vector2::new(0.0, 1.0),
            }
        );
        assert_eq!(Point3::from(args.points[0]), Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn calculate_topo_options() {
        let action = Action::try_from(envelope(json!({
            "action": "CalculateTopo",
            "args": {
                "obb": {"p0": {"x": 0, "y": 0}, "p1": {"x": 2, "y": 0}, "p3": {"x": 0, "y": 1}},
                "points": [],
                "resolution": 1,
                "variogramModel": "gaussian",
                "output": "points",
                "includeVariance": true
            }
        })))
        .unwrap();
        let Action::CalculateTopo(args) = action else {
            panic!("expected CalculateTopo");
        };
        assert_eq!(args.variogram_model, Some(VariogramModelKind::Gaussian));
        assert_eq!(args.output, OutputShape::Points);
        assert!(args.include_variance);
        assert!(matches!(args.obb, DomainDto::Corner { .. }));
    }

    #[test]
    fn runtime_path_in_args_wins_over_top_level() {
        let args = json!({
            "obb": {"p0": {"x": 0, "y": 0}, "p1": {"x": 2, "y": 0}, "p3": {"x": 0, "y": 1}},
            "points": [],
            "resolution": 1
        });
        let Action::CalculateTopo(top) = Action::try_from(envelope(json!({
            "action": "CalculateTopo",
            "runtimePath": "/tmp/top",
            "args": args.clone()
        })))
        .unwrap() else {
            panic!("expected CalculateTopo");
        };
        assert_eq!(top.runtime_path, Some(PathBuf::from("/tmp/top")));

        let mut with_own = args;
        with_own["runtimePath"] = json!("/tmp/own");
        let Action::CalculateTopo(own) = Action::try_from(envelope(json!({
            "action": "CalculateTopo",
            "runtimePath": "/tmp/top",
            "args": with_own
        })))
        .unwrap() else {
            panic!("expected CalculateTopo");
        };
        assert_eq!(own.runtime_path, Some(PathBuf::from("/tmp/own")));
    }

    #[test]
    fn missing_args_are_invalid() {
        let err = Action::try_from(envelope(json!({"action": "CalculateTopo"}))).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArguments(_)));
    }

    #[test]
    fn four_corner_domain_uses_p0_p1_p3() {
        let dto: DomainDto = serde_json::from_value(json!({
            "pts": [{"x": 0, "y": 0}, {"x": 3, "y": 0}, {"x": 3, "y": 2}, {"x": 0, "y": 2}]
        }))
        .unwrap();
        assert_eq!(
            DomainDescriptor::try_from(dto).unwrap(),
            DomainDescriptor::Corner {
                p0: Point2::new(0.0, 0.0),
                p1: Point2::new(3.0, 0.0),
                p3: Point2::new(0.0, 2.0),
            }
        );
    }

    #[test]
    fn three_corner_list_is_invalid() {
        let dto: DomainDto = serde_json::from_value(json!({
            "pts": [{"x": 0, "y": 0}, {"x": 3, "y": 0}, {"x": 3, "y": 2}]
        }))
        .unwrap();
        let err = DomainDescriptor::try_from(dto).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArguments(_)));
    }

    #[test]
    fn grid_points_are_rounded_and_ordered_z_i_j() {
        let point = OutputPoint::Grid(GridPointDto {
            z: round3(1.23456),
            i: 2,
            j: 7,
            variance: None,
        });
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"z":1.235,"i":2,"j":7}"#
        );
    }

    #[test]
    fn test_job_result_shape() {
        let response = Response::success(json!({"action": "TEST"}), JobResult::test());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "result": true,
                "message": "Received successfully",
                "data": {"action": "TEST"},
                "jobResult": {"print": "Test"}
            })
        );
    }

    #[test]
    fn topo_job_result_omits_absent_fields() {
        let job = JobResult::Topo(TopoJobResult {
            duration: 0.012,
            count: 0,
            max_i: 0,
            max_j: 0,
            resolution: 1.0,
            points: None,
            point_file_path: Some("/tmp/x.json".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({
                "duration": 0.012,
                "count": 0,
                "maxI": 0,
                "maxJ": 0,
                "resolution": 1.0,
                "pointFilePath": "/tmp/x.json"
            })
        );
    }
}
