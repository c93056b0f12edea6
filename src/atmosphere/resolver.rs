//! End-to-end density resolution for one (epoch, position)

use super::{
    AtmosphereDensity, DensityModel, DensityResultNormalizer, GeodeticPosition, ModelRequest,
};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::epoch::{DayOfYearCalculator, DayOfYearInfo, Epoch};
use crate::errors::ResolveResult;
use crate::space_weather::{SpaceWeatherIndexStore, SpaceWeatherIndices};
use serde::Serialize;
use std::sync::Arc;

/// Lowest altitude (km) the model is considered valid at
pub const MIN_MODEL_ALTITUDE_KM: f64 = 100.0;

/// Every intermediate value of one resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub epoch: Epoch,
    pub day: DayOfYearInfo,
    pub indices: SpaceWeatherIndices,
    /// Positional arguments the model was run with
    pub model_args: Vec<String>,
    /// First line of model output, as captured
    pub raw: String,
    pub density: AtmosphereDensity,
}

/// Epoch + position → density in kg/m³
///
/// Runs decomposition, day-of-year, index lookup, model invocation and
/// normalization in order, stopping at the first failure.
pub struct DragDensityResolver {
    calendar: DayOfYearCalculator,
    indices: SpaceWeatherIndexStore,
    model: Box<dyn DensityModel>,
    normalizer: DensityResultNormalizer,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl DragDensityResolver {
    /// Resolver with the default normalizer, reporting diagnostics to the log
    pub fn new(
        calendar: DayOfYearCalculator,
        indices: SpaceWeatherIndexStore,
        model: Box<dyn DensityModel>,
    ) -> Self {
        Self {
            calendar,
            indices,
            model,
            normalizer: DensityResultNormalizer::default(),
            diagnostics: Arc::new(LogSink),
        }
    }

    /// Replace the output normalizer
    pub fn with_normalizer(mut self, normalizer: DensityResultNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Send diagnostics somewhere other than the log
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Day-of-year tables in use
    pub fn calendar(&self) -> &DayOfYearCalculator {
        &self.calendar
    }

    /// Source of F10.7 and Ap
    pub fn index_store(&self) -> &SpaceWeatherIndexStore {
        &self.indices
    }

    /// The external density model
    pub fn model(&self) -> &dyn DensityModel {
        self.model.as_ref()
    }

    /// Where non-fatal conditions are reported
    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink> {
        &self.diagnostics
    }

    /// Density for a textual epoch and a geodetic position
    pub fn resolve(&self, epoch: &str, position: &GeodeticPosition) -> ResolveResult<AtmosphereDensity> {
        let epoch = Epoch::parse(epoch)?;
        Ok(self.resolve_epoch(&epoch, position)?.density)
    }

    /// Epoch decomposition, day-of-year and index lookup, without running the model
    pub fn inputs(&self, epoch: &Epoch) -> ResolveResult<(DayOfYearInfo, SpaceWeatherIndices)> {
        let day = self.calendar.for_epoch(epoch)?;
        log::debug!(
            "{} is day {} (F10.7 key {} {})",
            epoch,
            day.day_of_year,
            day.f107_lookup_year,
            day.previous_day_of_year
        );

        let indices = self.indices.indices(epoch, &day)?;
        Ok((day, indices))
    }

    /// Full resolution with every intermediate value
    pub fn resolve_epoch(&self, epoch: &Epoch, position: &GeodeticPosition) -> ResolveResult<Resolution> {
        if position.altitude_km < MIN_MODEL_ALTITUDE_KM {
            self.diagnostics.report(Diagnostic::AltitudeTooLow {
                altitude_km: position.altitude_km,
            });
        }

        let (day, indices) = self.inputs(epoch)?;

        let request = ModelRequest::new(epoch, &day, position, &indices);
        let raw = self.model.invoke(&request)?;
        let density = self.normalizer.normalize(&raw)?;

        if density.substituted {
            self.diagnostics.report(Diagnostic::SentinelSubstituted {
                raw: raw.clone(),
                density: density.rho,
            });
        }
        log::debug!("{} density at {}: {:e} kg/m³", self.model.name(), epoch, density.rho);

        Ok(Resolution {
            epoch: *epoch,
            day,
            indices,
            model_args: request.args(),
            raw,
            density,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::errors::DensityError;
    use crate::space_weather::RecordCache;
    use approx::assert_relative_eq;
    use parking_lot::Mutex;

    const SOLFSMY: &str = "\
2020  74 2458923.0   70.1  71.4
";

    struct StubModel {
        output: String,
        requests: Arc<Mutex<Vec<ModelRequest>>>,
    }

    impl DensityModel for StubModel {
        fn invoke(&self, request: &ModelRequest) -> ResolveResult<String> {
            self.requests.lock().push(request.clone());
            Ok(self.output.clone())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn resolver(output: &str) -> (DragDensityResolver, Arc<Mutex<Vec<ModelRequest>>>, Arc<DiagnosticLog>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::new(DiagnosticLog::new());
        let apindex = format!("200315{}  5 10 15 20 25 30 35 40", " ".repeat(25));

        let store = SpaceWeatherIndexStore::new(
            Box::new(RecordCache::from_text("SOLFSMY.TXT", SOLFSMY)),
            Box::new(RecordCache::from_text("apindex", &apindex)),
        );
        let model = StubModel {
            output: output.to_string(),
            requests: requests.clone(),
        };
        let resolver = DragDensityResolver::new(DayOfYearCalculator::default(), store, Box::new(model))
            .with_diagnostics(log.clone());
        (resolver, requests, log)
    }

    #[test]
    fn test_resolves_scenario() {
        let (resolver, requests, log) = resolver("1.234e-11");
        let position = GeodeticPosition::new(51.5, -0.1278, 400.0);

        let density = resolver
            .resolve("15/03/2020 12:30:45.000000 Z", &position)
            .unwrap();
        assert_relative_eq!(density.rho, 1.234e-8, max_relative = 1e-12);
        assert!(!density.substituted);
        assert!(log.is_empty());

        let requests = requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].args(),
            vec!["75", "2020", "45045", "400.0000", "51.50000", "-0.12780", "0", "70.1", "71.4", "23"]
        );
    }

    #[test]
    fn test_boxed_model_dispatch() {
        let (resolver, requests, _) = resolver("2.0e-12");
        assert_eq!(resolver.model().name(), "stub");

        let epoch = Epoch::parse("15/03/2020 12:30:45.000000 Z").unwrap();
        let (day, indices) = resolver.inputs(&epoch).unwrap();
        let request = ModelRequest::new(&epoch, &day, &GeodeticPosition::new(0.0, 0.0, 400.0), &indices);

        let raw = resolver.model().invoke(&request).unwrap();
        assert_eq!(raw, "2.0e-12");
        assert_eq!(requests.lock().len(), 1);
    }

    #[test]
    fn test_resolution_details() {
        let (resolver, _, _) = resolver("1.234e-11");
        let epoch = Epoch::parse("15/03/2020 12:30:45.000000 Z").unwrap();
        let resolution = resolver
            .resolve_epoch(&epoch, &GeodeticPosition::new(0.0, 0.0, 400.0))
            .unwrap();

        assert_eq!(resolution.day.day_of_year, 75);
        assert_eq!(resolution.indices.ap, 23);
        assert_eq!(resolution.raw, "1.234e-11");
        assert_eq!(resolution.model_args.len(), 10);
    }

    #[test]
    fn test_sentinel_reported() {
        let (resolver, _, log) = resolver("inf");
        let density = resolver
            .resolve("15/03/2020 12:30:45.000000 Z", &GeodeticPosition::new(0.0, 0.0, 400.0))
            .unwrap();

        assert!(density.substituted);
        assert_eq!(density.rho, 1.0e-13);
        assert_eq!(
            log.drain(),
            vec![Diagnostic::SentinelSubstituted {
                raw: "inf".to_string(),
                density: 1.0e-13
            }]
        );
    }

    #[test]
    fn test_low_altitude_still_resolves() {
        let (resolver, requests, log) = resolver("1.0e-9");
        let density = resolver
            .resolve("15/03/2020 12:30:45.000000 Z", &GeodeticPosition::new(0.0, 0.0, 95.0))
            .unwrap();

        assert_relative_eq!(density.rho, 1.0e-6, max_relative = 1e-12);
        assert_eq!(requests.lock().len(), 1);
        assert_eq!(log.drain(), vec![Diagnostic::AltitudeTooLow { altitude_km: 95.0 }]);
    }

    #[test]
    fn test_first_failure_stops_pipeline() {
        let (resolver, requests, _) = resolver("1.0e-12");
        let position = GeodeticPosition::new(0.0, 0.0, 400.0);

        let result = resolver.resolve("not an epoch", &position);
        assert!(matches!(result, Err(DensityError::EpochFormat { .. })));

        let result = resolver.resolve("15/12/2020 00:00:00.000000 UTC", &position);
        assert!(matches!(result, Err(DensityError::LookupTable { month: 12, .. })));

        let result = resolver.resolve("16/03/2020 00:00:00.000000 UTC", &position);
        assert!(matches!(result, Err(DensityError::IndexNotFound { .. })));

        assert!(requests.lock().is_empty());
    }

    #[test]
    fn test_malformed_output_propagates() {
        let (resolver, _, log) = resolver("1.2.3e-11");
        let result = resolver.resolve(
            "15/03/2020 12:30:45.000000 Z",
            &GeodeticPosition::new(0.0, 0.0, 400.0),
        );
        assert!(matches!(result, Err(DensityError::MalformedDensity { .. })));
        assert!(log.is_empty());
    }
}
