//! User-facing reply texts

use crate::db::CredentialRecord;
use crate::generator::{GenerationSettings, MAX_LENGTH, MIN_LENGTH};

pub const HELP: &str = "Команды:
/settings — настройки генерации
/password — сгенерировать пароль

/add — добавить запись
/list — список сервисов
/get <сервис> — логин и пароль
/delete <сервис> — удалить (+/-)
/change <сервис> — изменить пароль
";

pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Напишите /start";
pub const STORAGE_ERROR: &str = "Ошибка хранилища, попробуйте позже";

// Settings wizard
pub const ASK_LENGTH: &str = "Введите длину пароля (6–64):";
pub const ASK_DIGITS: &str = "Использовать цифры? (+ / -)";
pub const ASK_UPPER: &str = "Использовать заглавные буквы? (+ / -)";
pub const ASK_LOWER: &str = "Использовать строчные буквы? (+ / -)";
pub const ASK_SPECIAL: &str = "Использовать специальные символы? (+ / -)";
pub const ANSWER_YES_NO: &str = "Ответьте + или -";
pub const NO_CLASSES: &str = "Нужно выбрать хотя бы один набор символов";

// Manager wizard
pub const ASK_SERVICE: &str = "Введите название сервиса:";
pub const ASK_METHOD: &str = "Выберите способ создания пароля:
1. Автоматическая генерация
2. Ввод вручную";
pub const ASK_PASSWORD: &str = "Введите пароль:";
pub const ASK_NEW_PASSWORD: &str = "Введите новый пароль:";
pub const CHOOSE_METHOD: &str = "Введите 1 или 2";
pub const SAVED: &str = "Данные сохранены";
pub const NOT_FOUND: &str = "Сервис не найден";
pub const DELETE_CANCELLED: &str = "Удаление отменено";
pub const NO_SERVICES: &str = "У вас пока нет сервисов";

pub const USAGE_GET: &str = "Использование: /get <сервис>";
pub const USAGE_DELETE: &str = "Использование: /delete <сервис>";
pub const USAGE_CHANGE: &str = "Использование: /change <сервис>";

pub fn length_invalid() -> String {
    format!("Длина должна быть числом от {MIN_LENGTH} до {MAX_LENGTH}")
}

pub fn settings_summary(settings: &GenerationSettings) -> String {
    format!(
        "Новые параметры. Длина = {}; наличие цифр {}; наличие заглавных букв {}; \
         наличие строчных букв {}; наличие спецсимволов {}",
        settings.length,
        settings.use_digits,
        settings.use_upper,
        settings.use_lower,
        settings.use_special
    )
}

pub fn your_password(password: &str) -> String {
    format!("Ваш пароль: {password}")
}

pub fn ask_login(service: &str) -> String {
    format!("Введите логин для {service}:")
}

pub fn generated_and_saved(service: &str, password: &str) -> String {
    format!("Пароль для {service}: {password}\n{SAVED}")
}

pub fn credential(record: &CredentialRecord) -> String {
    format!(
        "{}:\nЛогин: {}\nПароль: {}",
        record.service, record.login, record.password
    )
}

pub fn service_list(services: &[String]) -> String {
    if services.is_empty() {
        return NO_SERVICES.to_string();
    }
    let mut out = format!("Ваши сервисы (всего: {}):", services.len());
    for (index, service) in services.iter().enumerate() {
        out.push_str(&format!("\n{}. {service}", index + 1));
    }
    out
}

pub fn confirm_delete(service: &str) -> String {
    format!("Удалить данные для \"{service}\"? (+ / -)")
}

pub fn deleted(service: &str) -> String {
    format!("Данные для \"{service}\" удалены")
}

pub fn change_prompt(record: &CredentialRecord) -> String {
    format!(
        "Текущий логин для {}: {}\nВыберите способ создания нового пароля:\n\
         1. Автоматическая генерация\n2. Ввод вручную",
        record.service, record.login
    )
}

pub fn change_not_found(service: &str) -> String {
    format!("Сервис \"{service}\" не найден.\nИспользуйте /list.")
}

pub fn changed_generated(service: &str, password: &str) -> String {
    format!("Новый пароль для {service}: {password}\nПароль изменён")
}

pub fn changed_manual(service: &str) -> String {
    format!("Пароль для {service} изменён")
}
