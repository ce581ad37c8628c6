//! 用户身份：进程内至多一个用户名
//!
//! SetName 覆盖写，GetName 与个性化读取；不提供删除。

/// 已记住的用户身份
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredIdentity {
    user_name: Option<String>,
}

impl StoredIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// 覆盖写入用户名（首尾空白会被去除）
    pub fn set_name(&mut self, name: impl AsRef<str>) {
        self.user_name = Some(name.as_ref().trim().to_string());
    }

    pub fn name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }
}
