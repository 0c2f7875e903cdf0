mod home;
pub use home::Home;

mod progress;
pub use progress::Progress;
