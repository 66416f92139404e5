use serde::Serialize;

use super::{FlowContext, FlowError, LogoutFlow, RouteGuard};
use crate::config::MapConfig;
use crate::models::UserInfo;

/// Initial view handed to the map widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// `(latitude, longitude)`
    pub center: (f64, f64),
    pub zoom: u8,
}

impl From<&MapConfig> for MapView {
    fn from(config: &MapConfig) -> Self {
        Self {
            center: (config.default_latitude, config.default_longitude),
            zoom: config.default_zoom,
        }
    }
}

/// What the landing screen renders for a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingView {
    pub user: UserInfo,
    pub map: MapView,
}

/// Post-login screen, reachable only through the route guard
pub struct LandingScreen {
    ctx: FlowContext,
    guard: RouteGuard,
    map: MapView,
}

impl LandingScreen {
    pub fn new(ctx: FlowContext, map: &MapConfig) -> Self {
        let guard = RouteGuard::new(ctx.store.clone(), ctx.navigator.clone());
        Self {
            ctx,
            guard,
            map: MapView::from(map),
        }
    }

    /// Nothing is rendered when the guard turns the user away
    pub fn mount(&self) -> Result<LandingView, FlowError> {
        let session = self.guard.check()?;
        Ok(LandingView {
            user: session.user,
            map: self.map,
        })
    }

    pub async fn logout(&self) -> Result<(), FlowError> {
        LogoutFlow::new(self.ctx.clone()).run().await
    }
}
