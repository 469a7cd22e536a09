pub mod accessor;
pub mod config;
pub mod controller;
pub mod error;
pub mod index;
pub mod navigation;
pub mod pinyin;
pub mod remote;
pub mod selection;
pub mod time;

pub use config::{LabelAccessor, PickerConfig, PickerMode, RemoteConfig};
pub use controller::{DISPLAY_WINDOW_SIZE, Picker};
pub use error::{PickerError, Result};
pub use index::SearchIndex;
pub use navigation::{HandleResult, Key, KeyEvent, NavigationState};
pub use pinyin::PinyinConverter;
pub use remote::{HttpTransport, RemoteSource, Throttle, Transport};
pub use selection::{ApplyOutcome, SelectionState};
pub use time::{Clock, ManualClock, SystemClock};
