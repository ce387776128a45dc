//! # hcbridge-adapter-catalog
//!
//! Built-in accessory factory for common hub device types, together with the
//! resolvers that read and write the facets it creates.
//!
//! ## Provided mappings
//!
//! | Type tag | Capability | Facets |
//! |----------|------------|--------|
//! | `binarySwitch` | Switch | on |
//! | `FGWP101`, `FGWP102` | Outlet | on, outlet in use |
//! | `multilevelSwitch`, `FGD212` | Lightbulb | on, brightness |
//! | `FGRGBW441M`, `colorController` | Lightbulb (color) | on, brightness, hue, saturation |
//! | `temperatureSensor` | Temperature sensor | current temperature |
//! | `humiditySensor` | Humidity sensor | relative humidity |
//! | `lightSensor` | Light sensor | ambient light level |
//! | `FGMS001`, `motionSensor` | Motion sensor (+ sibling temperature and light sensors) | motion detected |
//! | `doorSensor`, `windowSensor`, `FGDW002` | Contact sensor | contact state |
//! | `floodSensor`, `FGFS101` | Leak sensor | leak detected |
//! | `FGSS001`, `smokeSensor` | Smoke sensor | smoke detected |
//! | `rollerShutter`, `FGRM222`, `FGR221` | Window covering | positions |
//! | `FGR223` | Window covering | positions, tilt angles |
//! | `doorLock`, `gerda` | Lock mechanism | lock states |
//! | `thermostatDanfoss`, `thermostatHorstmann` | Thermostat | temperatures, heating/cooling states, display units |
//!
//! Every tag carries the `com.fibaro.` prefix on the hub. Other tags yield
//! no accessory.
//!
//! ## Dependency rule
//!
//! Depends on `hcbridge-app` (port traits) and `hcbridge-domain` only.

mod devices;
mod resolvers;

pub use devices::CatalogFactory;
pub use resolvers::register_resolvers;
