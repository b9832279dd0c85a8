pub mod status_route;
pub mod scrape_route;
