use core_types::Route;

/// Primary links in display order.
pub const PRIMARY_LINKS: [Route; 4] = [Route::Home, Route::Questions, Route::Tags, Route::Users];

const SIGNED_IN_ACTIONS: [Route; 2] = [Route::Profile, Route::Ask];
const SIGNED_OUT_ACTIONS: [Route; 2] = [Route::Login, Route::Signup];

/// Navigation-bar state: active route, auth-aware account actions, the
/// mobile menu, and the header search buffer. Pure state, no rendering;
/// the bar only needs to know whether a user is authenticated.
#[derive(Debug, Clone)]
pub struct Navbar {
    active: Route,
    mobile_menu_open: bool,
    search_input: String,
}

impl Default for Navbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Navbar {
    pub fn new() -> Self {
        Self {
            active: Route::Home,
            mobile_menu_open: false,
            search_input: String::new(),
        }
    }

    pub fn active(&self) -> Route {
        self.active
    }

    /// Whether a link should render highlighted. The Users link matches
    /// any `/users/*` path, the rest match exactly.
    pub fn is_active(&self, link: Route) -> bool {
        match link {
            Route::Users => self.active.path().starts_with("/users"),
            _ => self.active == link,
        }
    }

    /// Navigating also closes the mobile menu.
    pub fn navigate(&mut self, route: Route) {
        self.active = route;
        self.mobile_menu_open = false;
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn set_search_input(&mut self, input: impl Into<String>) {
        self.search_input = input.into();
    }

    pub fn primary_links(&self) -> &'static [Route] {
        &PRIMARY_LINKS
    }

    /// Right-hand account actions: profile and the ask-question entry for
    /// signed-in users, login and signup otherwise.
    pub fn account_actions(&self, authenticated: bool) -> &'static [Route] {
        if authenticated {
            &SIGNED_IN_ACTIONS
        } else {
            &SIGNED_OUT_ACTIONS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_home_route() {
        let navbar = Navbar::new();
        assert_eq!(navbar.active(), Route::Home);
        assert!(navbar.is_active(Route::Home));
        assert!(!navbar.is_active(Route::Questions));
    }

    #[test]
    fn users_link_matches_any_users_path() {
        let mut navbar = Navbar::new();
        navbar.navigate(Route::Users);
        assert!(navbar.is_active(Route::Users));
        assert_eq!(navbar.active().path(), "/users/popular");
    }

    #[test]
    fn navigation_closes_the_mobile_menu() {
        let mut navbar = Navbar::new();
        navbar.toggle_mobile_menu();
        assert!(navbar.mobile_menu_open());

        navbar.navigate(Route::Ask);
        assert!(!navbar.mobile_menu_open());
        assert_eq!(navbar.active(), Route::Ask);
    }

    #[test]
    fn account_actions_follow_the_auth_signal() {
        let navbar = Navbar::new();
        assert_eq!(
            navbar.account_actions(true),
            [Route::Profile, Route::Ask]
        );
        assert_eq!(
            navbar.account_actions(false),
            [Route::Login, Route::Signup]
        );
    }

    #[test]
    fn search_buffer_is_plain_state() {
        let mut navbar = Navbar::new();
        navbar.set_search_input("flexbox centering");
        assert_eq!(navbar.search_input(), "flexbox centering");
    }
}
