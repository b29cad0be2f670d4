use std::cmp::Ordering;

use crate::plan::augmented_route::AugmentedRoute;

/// Orders routes for presentation: feasible before infeasible, then fastest
/// door-to-door (driving plus charging), ties broken by fewer stops and then
/// by cheaper charging. The first entry is marked recommended. Pure; the
/// stable sort preserves candidate order on full ties.
pub fn rank(mut routes: Vec<AugmentedRoute>) -> Vec<AugmentedRoute> {
    routes.sort_by(compare);

    for (index, route) in routes.iter_mut().enumerate() {
        route.set_recommended(index == 0 && route.is_feasible());
    }

    routes
}

fn compare(a: &AugmentedRoute, b: &AugmentedRoute) -> Ordering {
    b.is_feasible()
        .cmp(&a.is_feasible())
        .then_with(|| a.total_time().cmp(&b.total_time()))
        .then_with(|| a.stops().len().cmp(&b.stops().len()))
        .then_with(|| {
            a.charging_cost()
                .partial_cmp(&b.charging_cost())
                .unwrap_or(Ordering::Equal)
        })
}
