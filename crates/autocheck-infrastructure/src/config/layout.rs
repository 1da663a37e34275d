use serde::{Deserialize, Serialize};

/// Credential a tab's checks read from the secret store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretRef {
    pub service: String,
    pub account: String,
}

/// Configured shape of one tab: which system it targets and which checks it shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabLayout {
    pub id: String,
    pub system: String,
    pub checks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<SecretRef>,
}

impl TabLayout {
    fn new(id: &str, system: &str, checks: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            system: system.to_string(),
            checks: checks.iter().map(|c| c.to_string()).collect(),
            scheduled_check: None,
            credential: None,
        }
    }

    fn scheduled(mut self, name: &str) -> Self {
        self.scheduled_check = Some(name.to_string());
        self
    }

    fn credential(mut self, service: &str, account: &str) -> Self {
        self.credential = Some(SecretRef {
            service: service.to_string(),
            account: account.to_string(),
        });
        self
    }
}

/// Builtin tabs. М and МИ talk to the same backend and share its lock.
pub fn default_layout() -> Vec<TabLayout> {
    vec![
        TabLayout::new(
            "А",
            "A",
            &[
                "Проверка мониторинга",
                "Проверка пользователей online",
                "Проверка адаптера А",
                "Проверка логов адаптера А",
            ],
        )
        .credential("AdapterA", "admin"),
        TabLayout::new(
            "М",
            "M",
            &["Проверка API шлюза", "Проверка шифрования", "Проверка очередей"],
        ),
        TabLayout::new(
            "МИ",
            "M",
            &["Проверка доступности сайта", "Проверка доступности служб"],
        ),
        TabLayout::new(
            "П",
            "P",
            &[
                "Проверка доступности ссылок",
                "Проверка адаптера",
                "Проверка логов Elastic",
            ],
        )
        .scheduled("Проверка PowerBi")
        .credential("AdapterP", "admin"),
        TabLayout::new(
            "G",
            "G",
            &["Проверка сервисов системы", "Проверка нагрузки на сервера"],
        ),
        TabLayout::new(
            "K",
            "K",
            &["Проверка топиков", "Проверка потребителей", "Проверка задержек"],
        ),
    ]
}
