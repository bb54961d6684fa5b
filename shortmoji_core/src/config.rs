//! `config`：运行时设置（总开关 + 自动替换开关）。
//!
//! 设置来自外部存储（浏览器同步存储 / CLI 命令），engine 每次事件都读最新值，
//! 变更通过订阅回调写入 `SettingsHandle`，无需重启。
//!
//! 解析一律“宽松且默认开启”：缺失、类型不对、JSON 损坏的值都按 `true` 处理。

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_AUTO_REPLACE: &str = "autoReplace";

/// 引擎设置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// 总开关
    #[serde(default = "default_true", deserialize_with = "lenient_flag")]
    pub enabled: bool,
    /// 是否启用 `:shortcode:` 即时替换
    #[serde(
        default = "default_true",
        rename = "autoReplace",
        deserialize_with = "lenient_flag"
    )]
    pub auto_replace: bool,
}

fn default_true() -> bool {
    true
}

/// 任意 JSON 值：布尔值原样取用，其它一律按 `true`。
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flag(Some(&value)))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_replace: true,
        }
    }
}

impl Settings {
    /// 从存储快照解析：`{"enabled": bool, "autoReplace": bool}`。
    pub fn from_json(s: &str) -> Self {
        serde_json::from_str(s).unwrap_or_else(|err| {
            log::warn!("malformed settings ({err}), falling back to defaults");
            Self::default()
        })
    }

    /// 合并一次变更；未出现的键保持原值。
    pub fn apply(&mut self, change: &SettingsChange) {
        if let Some(v) = change.enabled {
            self.enabled = v;
        }
        if let Some(v) = change.auto_replace {
            self.auto_replace = v;
        }
    }
}

fn flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(true)
}

/// 存储变更通知：只有出现的键才会被更新。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub enabled: Option<bool>,
    pub auto_replace: Option<bool>,
}

impl SettingsChange {
    pub fn enabled(v: bool) -> Self {
        Self {
            enabled: Some(v),
            ..Self::default()
        }
    }

    pub fn auto_replace(v: bool) -> Self {
        Self {
            auto_replace: Some(v),
            ..Self::default()
        }
    }

    /// 解析存储变更通知：`{"enabled": {"newValue": false}}`。
    ///
    /// 键存在但 `newValue` 不是布尔值时按 `true` 处理。
    pub fn from_storage_json(s: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(s) else {
            log::warn!("malformed settings change ignored");
            return Self::default();
        };
        let read = |key: &str| value.get(key).map(|c| flag(c.get("newValue")));
        Self {
            enabled: read(KEY_ENABLED),
            auto_replace: read(KEY_AUTO_REPLACE),
        }
    }
}

/// engine 持有的设置句柄（单线程共享）。
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle(Rc<Cell<Settings>>);

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self(Rc::new(Cell::new(settings)))
    }

    pub fn get(&self) -> Settings {
        self.0.get()
    }

    pub fn set(&self, settings: Settings) {
        self.0.set(settings);
    }

    pub fn apply(&self, change: &SettingsChange) {
        let mut s = self.0.get();
        s.apply(change);
        self.0.set(s);
    }
}

/// 设置存储的抽象：读取当前值 + 订阅变更。
pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn subscribe(&self, listener: Box<dyn Fn(&SettingsChange)>);
}

/// 内存设置存储：`set` 同步通知所有订阅者。
#[derive(Default)]
pub struct MemorySettingsStore {
    current: Cell<Settings>,
    listeners: RefCell<Vec<Box<dyn Fn(&SettingsChange)>>>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Cell::new(settings),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn set(&self, change: SettingsChange) {
        let mut s = self.current.get();
        s.apply(&change);
        self.current.set(s);
        for l in self.listeners.borrow().iter() {
            l(&change);
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.current.get()
    }

    fn subscribe(&self, listener: Box<dyn Fn(&SettingsChange)>) {
        self.listeners.borrow_mut().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fail_open() {
        assert_eq!(Settings::from_json("{}"), Settings::default());
        assert_eq!(Settings::from_json("not json"), Settings::default());
        let s = Settings::from_json(r#"{"enabled": "yes", "autoReplace": false}"#);
        assert!(s.enabled);
        assert!(!s.auto_replace);
    }

    #[test]
    fn storage_change_only_touches_present_keys() {
        let c = SettingsChange::from_storage_json(r#"{"autoReplace": {"newValue": false}}"#);
        assert_eq!(c, SettingsChange::auto_replace(false));

        let c = SettingsChange::from_storage_json(r#"{"enabled": {"oldValue": false}}"#);
        assert_eq!(c, SettingsChange::enabled(true));

        let mut s = Settings {
            enabled: false,
            auto_replace: false,
        };
        s.apply(&SettingsChange::auto_replace(true));
        assert!(!s.enabled);
        assert!(s.auto_replace);
    }

    #[test]
    fn snapshot_uses_storage_key_names() {
        let s = Settings::from_json(r#"{"enabled": false}"#);
        assert!(!s.enabled);
        assert!(s.auto_replace);

        let s = Settings::from_json(r#"{"autoReplace": null, "enabled": 0, "theme": "dark"}"#);
        assert_eq!(s, Settings::default());

        // 顶层不是对象
        assert_eq!(Settings::from_json("42"), Settings::default());
        assert_eq!(Settings::from_json("null"), Settings::default());
    }

    #[test]
    fn memory_store_notifies_subscribers() {
        let store = MemorySettingsStore::default();
        let handle = SettingsHandle::new(store.load());
        let h = handle.clone();
        store.subscribe(Box::new(move |c| h.apply(c)));

        store.set(SettingsChange::enabled(false));
        assert!(!handle.get().enabled);
        assert!(handle.get().auto_replace);
        assert!(!store.load().enabled);
    }
}
