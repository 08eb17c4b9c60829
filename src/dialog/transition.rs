//! Pure state transition function
//!
//! Given a session and an event, computes the next session and the effects
//! the engine must run. No I/O happens here.

use super::command::Command;
use super::event::{GeneratePurpose, LookupPurpose};
use super::replies;
use super::state::{parse_yes_no, ManagerFlow, PasswordMethod, SettingsStep};
use super::{DialogMode, Effect, Event, Session};
use crate::db::CredentialRecord;
use crate::generator::{is_valid_length, GenerationSettings};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.with_effect(Effect::reply(text))
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Where an inbound line of text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The wizard in flight consumes the text as a step answer
    Wizard,
    /// The text is a command; any wizard in flight is abandoned
    Command(Command),
}

/// `/settings` and `/password` always win over a wizard in flight.
pub fn route(mode: &DialogMode, text: &str) -> Route {
    if let Some(command) = Command::interrupting(text) {
        return Route::Command(command);
    }
    if mode.is_idle() {
        Route::Command(Command::parse(text))
    } else {
        Route::Wizard
    }
}

/// Pure transition function
pub fn transition(session: &Session, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::Text(text) => Ok(on_text(session, text.trim())),

        // A storage failure aborts whatever was in flight
        Event::StorageFailed => {
            Ok(TransitionResult::new(session.with_mode(DialogMode::Idle))
                .reply(replies::STORAGE_ERROR))
        }

        // Effect outcomes only ever arrive after the emitting step reset the mode
        event if !session.mode.is_idle() => Err(TransitionError::InvalidTransition(format!(
            "No transition from {:?} with event {:?}",
            session.mode, event
        ))),

        Event::Lookup {
            service,
            purpose,
            record,
        } => Ok(on_lookup(session, service, purpose, record)),

        Event::Listed { services } => {
            Ok(TransitionResult::new(session.clone()).reply(replies::service_list(&services)))
        }

        Event::Generated { purpose, password } => Ok(on_generated(session, purpose, password)),

        Event::GenerationFailed => {
            Ok(TransitionResult::new(session.clone()).reply(replies::NO_CLASSES))
        }
    }
}

fn on_text(session: &Session, text: &str) -> TransitionResult {
    match route(&session.mode, text) {
        Route::Command(command) => on_command(session, command),
        Route::Wizard => match &session.mode {
            DialogMode::Settings { step, draft } => on_settings_step(session, *step, *draft, text),
            DialogMode::Manager { flow } => on_manager_step(session, flow, text),
            DialogMode::Idle => on_command(session, Command::parse(text)),
        },
    }
}

// ============================================================
// Command Dispatch
// ============================================================

fn on_command(session: &Session, command: Command) -> TransitionResult {
    let idle = session.with_mode(DialogMode::Idle);

    match command {
        Command::Start => TransitionResult::new(idle).reply(replies::HELP),

        // Restart from the first step, dropping any partial draft
        Command::Settings => TransitionResult::new(session.with_mode(DialogMode::settings(
            SettingsStep::WaitLength,
            session.settings,
        )))
        .reply(replies::ASK_LENGTH),

        // One-off generation from the committed settings
        Command::Password => TransitionResult::new(idle).with_effect(Effect::Generate {
            settings: session.settings,
            purpose: GeneratePurpose::Quick,
        }),

        Command::Add => TransitionResult::new(session.with_mode(DialogMode::manager(
            ManagerFlow::AddService,
        )))
        .reply(replies::ASK_SERVICE),

        Command::List => TransitionResult::new(idle).with_effect(Effect::ListServices),

        Command::Get(service) => with_service(idle, service, replies::USAGE_GET, LookupPurpose::Show),

        Command::Delete(service) => with_service(
            idle,
            service,
            replies::USAGE_DELETE,
            LookupPurpose::ConfirmDelete,
        ),

        Command::Change(service) => with_service(
            idle,
            service,
            replies::USAGE_CHANGE,
            LookupPurpose::BeginChange,
        ),

        Command::Unknown => TransitionResult::new(idle).reply(replies::UNKNOWN_COMMAND),
    }
}

fn with_service(
    idle: Session,
    service: Option<String>,
    usage: &str,
    purpose: LookupPurpose,
) -> TransitionResult {
    match service {
        Some(service) => TransitionResult::new(idle).with_effect(Effect::lookup(service, purpose)),
        None => TransitionResult::new(idle).reply(usage),
    }
}

// ============================================================
// Settings Wizard
// ============================================================

fn on_settings_step(
    session: &Session,
    step: SettingsStep,
    mut draft: GenerationSettings,
    text: &str,
) -> TransitionResult {
    if step == SettingsStep::WaitLength {
        return match text.parse::<usize>() {
            Ok(length) if is_valid_length(length) => {
                draft.length = length;
                TransitionResult::new(
                    session.with_mode(DialogMode::settings(SettingsStep::AskDigits, draft)),
                )
                .reply(replies::ASK_DIGITS)
            }
            _ => TransitionResult::new(session.clone()).reply(replies::length_invalid()),
        };
    }

    let Some(answer) = parse_yes_no(text) else {
        return TransitionResult::new(session.clone()).reply(replies::ANSWER_YES_NO);
    };

    let (next, prompt) = match step {
        SettingsStep::AskDigits => {
            draft.use_digits = answer;
            (SettingsStep::AskUpper, replies::ASK_UPPER)
        }
        SettingsStep::AskUpper => {
            draft.use_upper = answer;
            (SettingsStep::AskLower, replies::ASK_LOWER)
        }
        SettingsStep::AskLower => {
            draft.use_lower = answer;
            (SettingsStep::AskSpecial, replies::ASK_SPECIAL)
        }
        SettingsStep::AskSpecial | SettingsStep::WaitLength => {
            draft.use_special = answer;
            return finish_settings(session, draft);
        }
    };

    TransitionResult::new(session.with_mode(DialogMode::settings(next, draft))).reply(prompt)
}

fn finish_settings(session: &Session, draft: GenerationSettings) -> TransitionResult {
    // An empty alphabet is never committed; ask for the classes again
    if !draft.has_any_class() {
        return TransitionResult::new(
            session.with_mode(DialogMode::settings(SettingsStep::AskDigits, draft)),
        )
        .reply(format!("{}\n{}", replies::NO_CLASSES, replies::ASK_DIGITS));
    }

    let committed = Session {
        settings: draft,
        mode: DialogMode::Idle,
    };
    TransitionResult::new(committed).reply(replies::settings_summary(&draft))
}

// ============================================================
// Manager Wizard
// ============================================================

fn on_manager_step(session: &Session, flow: &ManagerFlow, text: &str) -> TransitionResult {
    let stay = || TransitionResult::new(session.clone());
    let goto = |next: ManagerFlow| TransitionResult::new(session.with_mode(DialogMode::manager(next)));
    let idle = || TransitionResult::new(session.with_mode(DialogMode::Idle));

    match flow {
        ManagerFlow::AddService => {
            if text.is_empty() {
                return stay().reply(replies::ASK_SERVICE);
            }
            goto(ManagerFlow::AddLogin {
                service: text.to_string(),
            })
            .reply(replies::ask_login(text))
        }

        ManagerFlow::AddLogin { service } => {
            if text.is_empty() {
                return stay().reply(replies::ask_login(service));
            }
            goto(ManagerFlow::AddMethod {
                service: service.clone(),
                login: text.to_string(),
            })
            .reply(replies::ASK_METHOD)
        }

        ManagerFlow::AddMethod { service, login } => match PasswordMethod::parse(text) {
            Some(PasswordMethod::Generate) => idle().with_effect(Effect::Generate {
                settings: session.settings,
                purpose: GeneratePurpose::AddCredential {
                    service: service.clone(),
                    login: login.clone(),
                },
            }),
            Some(PasswordMethod::Manual) => goto(ManagerFlow::AddPassword {
                service: service.clone(),
                login: login.clone(),
            })
            .reply(replies::ASK_PASSWORD),
            None => stay().reply(replies::CHOOSE_METHOD),
        },

        ManagerFlow::AddPassword { service, login } => {
            if text.is_empty() {
                return stay().reply(replies::ASK_PASSWORD);
            }
            idle().with_effects([
                Effect::save(service.as_str(), login.as_str(), text),
                Effect::reply(replies::SAVED),
            ])
        }

        ManagerFlow::DeleteConfirm { service } => match parse_yes_no(text) {
            Some(true) => idle().with_effects([
                Effect::Delete {
                    service: service.clone(),
                },
                Effect::reply(replies::deleted(service)),
            ]),
            Some(false) => idle().reply(replies::DELETE_CANCELLED),
            None => stay().reply(replies::ANSWER_YES_NO),
        },

        ManagerFlow::ChangeMethod { service } => match PasswordMethod::parse(text) {
            Some(PasswordMethod::Generate) => idle().with_effect(Effect::Generate {
                settings: session.settings,
                purpose: GeneratePurpose::ChangeCredential {
                    service: service.clone(),
                },
            }),
            Some(PasswordMethod::Manual) => goto(ManagerFlow::ChangePassword {
                service: service.clone(),
            })
            .reply(replies::ASK_NEW_PASSWORD),
            None => stay().reply(replies::CHOOSE_METHOD),
        },

        // The login is re-read at completion in case the record vanished meanwhile
        ManagerFlow::ChangePassword { service } => {
            if text.is_empty() {
                return stay().reply(replies::ASK_NEW_PASSWORD);
            }
            idle().with_effect(Effect::lookup(
                service.as_str(),
                LookupPurpose::FinishChange {
                    password: text.to_string(),
                    generated: false,
                },
            ))
        }
    }
}

// ============================================================
// Effect Outcomes
// ============================================================

fn on_lookup(
    session: &Session,
    service: String,
    purpose: LookupPurpose,
    record: Option<CredentialRecord>,
) -> TransitionResult {
    let unchanged = TransitionResult::new(session.clone());

    let Some(record) = record else {
        let text = match purpose {
            LookupPurpose::BeginChange => replies::change_not_found(&service),
            _ => replies::NOT_FOUND.to_string(),
        };
        return unchanged.reply(text);
    };

    match purpose {
        LookupPurpose::Show => unchanged.reply(replies::credential(&record)),

        LookupPurpose::ConfirmDelete => TransitionResult::new(
            session.with_mode(DialogMode::manager(ManagerFlow::DeleteConfirm { service })),
        )
        .reply(replies::confirm_delete(&record.service)),

        LookupPurpose::BeginChange => TransitionResult::new(
            session.with_mode(DialogMode::manager(ManagerFlow::ChangeMethod { service })),
        )
        .reply(replies::change_prompt(&record)),

        LookupPurpose::FinishChange {
            password,
            generated,
        } => {
            let confirmation = if generated {
                replies::changed_generated(&service, &password)
            } else {
                replies::changed_manual(&service)
            };
            unchanged.with_effects([
                Effect::save(service, record.login, password),
                Effect::reply(confirmation),
            ])
        }
    }
}

fn on_generated(session: &Session, purpose: GeneratePurpose, password: String) -> TransitionResult {
    let unchanged = TransitionResult::new(session.clone());

    match purpose {
        GeneratePurpose::Quick => unchanged.reply(replies::your_password(&password)),

        GeneratePurpose::AddCredential { service, login } => {
            let confirmation = replies::generated_and_saved(&service, &password);
            unchanged.with_effects([
                Effect::save(service, login, password),
                Effect::reply(confirmation),
            ])
        }

        GeneratePurpose::ChangeCredential { service } => unchanged.with_effect(Effect::lookup(
            service,
            LookupPurpose::FinishChange {
                password,
                generated: true,
            },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(session: &Session, input: &str) -> TransitionResult {
        transition(session, Event::Text(input.to_string())).unwrap()
    }

    fn replies_of(result: &TransitionResult) -> Vec<&str> {
        result
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Reply(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Feed several lines, returning the final session and last result
    fn drive(inputs: &[&str]) -> (Session, TransitionResult) {
        let mut session = Session::default();
        let mut last = None;
        for input in inputs {
            let result = text(&session, input);
            session = result.new_session.clone();
            last = Some(result);
        }
        (session, last.unwrap())
    }

    #[test]
    fn test_start_replies_with_help() {
        let result = text(&Session::default(), "/start");
        assert_eq!(replies_of(&result), vec![replies::HELP]);
        assert!(result.new_session.mode.is_idle());
    }

    #[test]
    fn test_unknown_command() {
        let result = text(&Session::default(), "hello");
        assert_eq!(replies_of(&result), vec![replies::UNKNOWN_COMMAND]);
    }

    #[test]
    fn test_password_emits_generate_with_committed_settings() {
        let result = text(&Session::default(), "   /password   ");
        assert_eq!(
            result.effects,
            vec![Effect::Generate {
                settings: GenerationSettings::default(),
                purpose: GeneratePurpose::Quick,
            }]
        );
    }

    #[test]
    fn test_full_settings_dialog() {
        let (session, result) = drive(&["/settings", "8", "-", "+", "+", "-"]);
        assert!(session.mode.is_idle());
        assert_eq!(
            session.settings,
            GenerationSettings {
                length: 8,
                use_digits: false,
                use_upper: true,
                use_lower: true,
                use_special: false,
            }
        );
        assert_eq!(
            replies_of(&result),
            vec![
                "Новые параметры. Длина = 8; наличие цифр false; наличие заглавных букв true; \
                 наличие строчных букв true; наличие спецсимволов false"
            ]
        );
    }

    #[test]
    fn test_invalid_yes_no_reprompts_without_advancing() {
        let (session, result) = drive(&["/settings", "10", "да"]);
        assert_eq!(replies_of(&result), vec![replies::ANSWER_YES_NO]);
        assert!(matches!(
            session.mode,
            DialogMode::Settings {
                step: SettingsStep::AskDigits,
                ..
            }
        ));

        let result = text(&session, "+");
        assert_eq!(replies_of(&result), vec![replies::ASK_UPPER]);
    }

    #[test]
    fn test_invalid_length_reprompts() {
        for bad in ["abc", "5", "65", "-3", ""] {
            let (session, result) = drive(&["/settings", bad]);
            assert_eq!(replies_of(&result), vec![replies::length_invalid().as_str()]);
            assert!(matches!(
                session.mode,
                DialogMode::Settings {
                    step: SettingsStep::WaitLength,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_all_classes_disabled_restarts_class_questions() {
        let (session, result) = drive(&["/settings", "12", "-", "-", "-", "-"]);
        assert_eq!(
            replies_of(&result),
            vec![format!("{}\n{}", replies::NO_CLASSES, replies::ASK_DIGITS).as_str()]
        );
        assert_eq!(session.settings, GenerationSettings::default());
        match session.mode {
            DialogMode::Settings { step, draft } => {
                assert_eq!(step, SettingsStep::AskDigits);
                assert_eq!(draft.length, 12);
            }
            other => panic!("Expected settings wizard, got {other:?}"),
        }
    }

    #[test]
    fn test_password_mid_settings_uses_committed_settings() {
        let (session, _) = drive(&["/settings", "20", "-"]);
        let result = text(&session, "/password");
        assert!(result.new_session.mode.is_idle());
        assert_eq!(
            result.effects,
            vec![Effect::Generate {
                settings: GenerationSettings::default(),
                purpose: GeneratePurpose::Quick,
            }]
        );
    }

    #[test]
    fn test_settings_interrupts_add_flow() {
        let (session, result) = drive(&["/add", "Service", "/settings"]);
        assert_eq!(replies_of(&result), vec![replies::ASK_LENGTH]);
        assert!(matches!(
            session.mode,
            DialogMode::Settings {
                step: SettingsStep::WaitLength,
                ..
            }
        ));

        let result = text(&session, "15");
        assert_eq!(replies_of(&result), vec![replies::ASK_DIGITS]);
    }

    #[test]
    fn test_settings_interrupt_drops_pending_password_step() {
        let (session, _) = drive(&["/add", "Shop", "me@x.com", "2", "/settings"]);
        // The next line is a length answer, not the pending password
        let result = text(&session, "Secret1!");
        assert!(!result
            .effects
            .iter()
            .any(|effect| matches!(effect, Effect::Save { .. })));
        assert_eq!(replies_of(&result), vec![replies::length_invalid().as_str()]);
    }

    #[test]
    fn test_other_commands_mid_wizard_are_wizard_input() {
        let (session, result) = drive(&["/add", "/list"]);
        assert_eq!(replies_of(&result), vec!["Введите логин для /list:"]);
        assert!(matches!(
            session.mode,
            DialogMode::Manager {
                flow: ManagerFlow::AddLogin { .. }
            }
        ));
    }

    #[test]
    fn test_add_manual_flow() {
        let (session, result) = drive(&["/add", "Shop", "me@x.com", "2", "Secret1!"]);
        assert!(session.mode.is_idle());
        assert_eq!(
            result.effects,
            vec![
                Effect::save("Shop", "me@x.com", "Secret1!"),
                Effect::reply(replies::SAVED),
            ]
        );
    }

    #[test]
    fn test_add_auto_flow_requests_generation() {
        let (session, result) = drive(&["/add", "TestService", "test@email.com", "1"]);
        assert!(session.mode.is_idle());
        assert_eq!(
            result.effects,
            vec![Effect::Generate {
                settings: GenerationSettings::default(),
                purpose: GeneratePurpose::AddCredential {
                    service: "TestService".to_string(),
                    login: "test@email.com".to_string(),
                },
            }]
        );

        let generated = transition(
            &session,
            Event::Generated {
                purpose: GeneratePurpose::AddCredential {
                    service: "TestService".to_string(),
                    login: "test@email.com".to_string(),
                },
                password: "abcDEF123!".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            generated.effects,
            vec![
                Effect::save("TestService", "test@email.com", "abcDEF123!"),
                Effect::reply("Пароль для TestService: abcDEF123!\nДанные сохранены"),
            ]
        );
    }

    #[test]
    fn test_invalid_method_choice() {
        let (session, result) = drive(&["/add", "TestService", "test@test.com", "3"]);
        assert_eq!(replies_of(&result), vec![replies::CHOOSE_METHOD]);
        assert!(matches!(
            session.mode,
            DialogMode::Manager {
                flow: ManagerFlow::AddMethod { .. }
            }
        ));
    }

    #[test]
    fn test_missing_arguments_give_usage() {
        let session = Session::default();
        assert_eq!(replies_of(&text(&session, "/get")), vec![replies::USAGE_GET]);
        assert_eq!(replies_of(&text(&session, "/delete")), vec![replies::USAGE_DELETE]);
        assert_eq!(replies_of(&text(&session, "/change")), vec![replies::USAGE_CHANGE]);
    }

    #[test]
    fn test_delete_lookup_enters_confirmation() {
        let session = Session::default();
        let result = text(&session, "/delete Shop");
        assert_eq!(
            result.effects,
            vec![Effect::lookup("Shop", LookupPurpose::ConfirmDelete)]
        );

        let found = transition(
            &result.new_session,
            Event::Lookup {
                service: "Shop".to_string(),
                purpose: LookupPurpose::ConfirmDelete,
                record: Some(CredentialRecord::new(1, "Shop", "me", "pw")),
            },
        )
        .unwrap();
        assert_eq!(
            replies_of(&found),
            vec!["Удалить данные для \"Shop\"? (+ / -)"]
        );

        let confirmed = text(&found.new_session, "+");
        assert!(confirmed.new_session.mode.is_idle());
        assert_eq!(
            confirmed.effects,
            vec![
                Effect::Delete {
                    service: "Shop".to_string()
                },
                Effect::reply("Данные для \"Shop\" удалены"),
            ]
        );

        let cancelled = text(&found.new_session, "-");
        assert!(cancelled.new_session.mode.is_idle());
        assert_eq!(cancelled.effects, vec![Effect::reply(replies::DELETE_CANCELLED)]);
    }

    #[test]
    fn test_lookup_not_found_messages() {
        let session = Session::default();
        let missing = |purpose| {
            transition(
                &session,
                Event::Lookup {
                    service: "NonExistent".to_string(),
                    purpose,
                    record: None,
                },
            )
            .unwrap()
        };

        assert_eq!(
            replies_of(&missing(LookupPurpose::Show)),
            vec![replies::NOT_FOUND]
        );
        assert_eq!(
            replies_of(&missing(LookupPurpose::ConfirmDelete)),
            vec![replies::NOT_FOUND]
        );
        assert_eq!(
            replies_of(&missing(LookupPurpose::BeginChange)),
            vec!["Сервис \"NonExistent\" не найден.\nИспользуйте /list."]
        );

        let vanished = missing(LookupPurpose::FinishChange {
            password: "new".to_string(),
            generated: false,
        });
        assert!(vanished.new_session.mode.is_idle());
        assert_eq!(replies_of(&vanished), vec![replies::NOT_FOUND]);
    }

    #[test]
    fn test_change_manual_keeps_login() {
        let record = CredentialRecord::new(1, "ChangeManual", "login", "oldpass");
        let begun = transition(
            &Session::default(),
            Event::Lookup {
                service: "ChangeManual".to_string(),
                purpose: LookupPurpose::BeginChange,
                record: Some(record.clone()),
            },
        )
        .unwrap();
        assert_eq!(replies_of(&begun), vec![replies::change_prompt(&record).as_str()]);

        let manual = text(&begun.new_session, "2");
        assert_eq!(replies_of(&manual), vec![replies::ASK_NEW_PASSWORD]);

        let entered = text(&manual.new_session, "newpassword123");
        assert_eq!(
            entered.effects,
            vec![Effect::lookup(
                "ChangeManual",
                LookupPurpose::FinishChange {
                    password: "newpassword123".to_string(),
                    generated: false,
                }
            )]
        );

        let finished = transition(
            &entered.new_session,
            Event::Lookup {
                service: "ChangeManual".to_string(),
                purpose: LookupPurpose::FinishChange {
                    password: "newpassword123".to_string(),
                    generated: false,
                },
                record: Some(record),
            },
        )
        .unwrap();
        assert_eq!(
            finished.effects,
            vec![
                Effect::save("ChangeManual", "login", "newpassword123"),
                Effect::reply("Пароль для ChangeManual изменён"),
            ]
        );
    }

    #[test]
    fn test_storage_failure_resets_wizard() {
        let (session, _) = drive(&["/add", "Shop"]);
        let result = transition(&session, Event::StorageFailed).unwrap();
        assert!(result.new_session.mode.is_idle());
        assert_eq!(replies_of(&result), vec![replies::STORAGE_ERROR]);
    }

    #[test]
    fn test_effect_outcome_rejected_mid_wizard() {
        let (session, _) = drive(&["/add"]);
        let result = transition(
            &session,
            Event::Listed {
                services: vec![],
            },
        );
        assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }
}
