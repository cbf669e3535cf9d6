use std::io;
use std::io::Write;
use std::sync::Arc;

use crate::domain::account::models::Account;
use crate::domain::account::models::CreateAccountCommand;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountServicePort;

/// Interactive console menu over the account service.
///
/// Pure presentation: reads lines, prints results, and delegates every
/// decision to the service port. Stored hashes are never echoed.
pub struct Menu<S>
where
    S: AccountServicePort,
{
    service: Arc<S>,
}

impl<S> Menu<S>
where
    S: AccountServicePort,
{
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Run the menu loop until the operator quits.
    pub async fn run(&self) -> io::Result<()> {
        loop {
            print_menu();

            match prompt("Choose an option: ")?.as_str() {
                "1" => self.create_account().await?,
                "2" => self.list_active().await?,
                "3" => self.find_account().await?,
                "4" => self.update_email().await?,
                "5" => self.deactivate_account().await?,
                "6" => self.delete_account().await?,
                "7" => self.login().await?,
                "8" => self.change_password().await?,
                "9" => self.list_paginated().await?,
                "10" => self.verify_credentials().await?,
                "11" => self.unlock_account().await?,
                "0" => {
                    println!("Exiting.");
                    return Ok(());
                }
                _ => println!("Invalid option"),
            }
        }
    }

    async fn create_account(&self) -> io::Result<()> {
        let username = match Username::new(prompt("Username: ")?) {
            Ok(username) => username,
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };
        let email = match EmailAddress::new(prompt("Email: ")?) {
            Ok(email) => email,
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };
        let password = prompt("Password: ")?;

        match self
            .service
            .create_account(CreateAccountCommand::new(username, email, password))
            .await
        {
            Ok(account) => {
                println!("Account created:");
                println!("   ID: {}", account.id);
                println!("   Username: {}", account.username);
                println!("   Email: {}", account.email);
            }
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn list_active(&self) -> io::Result<()> {
        println!("\n=== ACTIVE ACCOUNTS ===");
        println!("{}", "-".repeat(100));
        println!(
            "{:<38} {:<16} {:<30} {:<16}",
            "ID", "USERNAME", "EMAIL", "LAST LOGIN"
        );
        println!("{}", "-".repeat(100));

        match self.service.list_active().await {
            Ok(accounts) => {
                for account in accounts {
                    println!(
                        "{:<38} {:<16} {:<30} {:<16}",
                        account.id,
                        account.username,
                        account.email,
                        format_last_login(&account)
                    );
                }
            }
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn find_account(&self) -> io::Result<()> {
        let username = prompt("Username to look up: ")?;

        match self.service.get_by_username(&username).await {
            Ok(Some(account)) => print_account(&account),
            Ok(None) => println!("Account not found"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn update_email(&self) -> io::Result<()> {
        let username = prompt("Username of the account to update: ")?;

        let account = match self.service.get_by_username(&username).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                println!("Account not found");
                return Ok(());
            }
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };

        let email = match EmailAddress::new(prompt("New email: ")?) {
            Ok(email) => email,
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };

        let command = UpdateAccountCommand {
            email: Some(email),
            password: None,
        };

        match self
            .service
            .update_email_and_password(&account.id, command)
            .await
        {
            Ok(_) => println!("Email updated"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn deactivate_account(&self) -> io::Result<()> {
        let username = prompt("Username to deactivate: ")?;

        let account = match self.service.get_by_username(&username).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                println!("Account not found");
                return Ok(());
            }
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };

        match self.service.deactivate(&account.id).await {
            Ok(_) => println!("Account deactivated (logical delete)"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn delete_account(&self) -> io::Result<()> {
        let username = prompt("Username to delete permanently: ")?;

        let account = match self.service.get_by_username(&username).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                println!("Account not found");
                return Ok(());
            }
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };

        // Physical deletion is irreversible; require explicit confirmation.
        let confirmation = prompt("This permanently deletes the account. Type 'yes' to confirm: ")?;
        if confirmation != "yes" {
            println!("Cancelled");
            return Ok(());
        }

        match self.service.delete_hard(&account.id).await {
            Ok(()) => println!("Account permanently deleted"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn login(&self) -> io::Result<()> {
        let username = prompt("Username: ")?;
        let password = prompt("Password: ")?;

        match self.service.login_with_lockout(&username, &password).await {
            Ok(Some(account)) => {
                println!("Welcome, {}!", account.username);
                println!("   Last login: {}", format_last_login(&account));
            }
            // Failures are deliberately indistinct: wrong password, locked
            // and deactivated accounts all read the same here.
            Ok(None) => println!("Login failed"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn change_password(&self) -> io::Result<()> {
        let username = prompt("Username: ")?;

        let account = match self.service.get_by_username(&username).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                println!("Account not found");
                return Ok(());
            }
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };

        let current = prompt("Current password: ")?;
        let new = prompt("New password: ")?;

        match self.service.change_password(&account.id, &current, &new).await {
            Ok(_) => println!("Password changed"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn list_paginated(&self) -> io::Result<()> {
        let Some(page_index) = parse_number(&prompt("Page number (starting at 0): ")?) else {
            println!("Page number must be a non-negative integer");
            return Ok(());
        };
        let Some(page_size) = parse_number(&prompt("Page size: ")?) else {
            println!("Page size must be a non-negative integer");
            return Ok(());
        };
        // The service contract requires page_size >= 1; raw input is
        // validated here.
        if page_size == 0 {
            println!("Page size must be at least 1");
            return Ok(());
        }

        match self.service.list_paginated(page_index, page_size).await {
            Ok(page) => {
                println!(
                    "Page {} of {} ({} accounts in total)",
                    page_index + 1,
                    page.total_pages,
                    page.total_elements
                );
                for account in page.items {
                    println!(
                        "   {} {} ({}){}",
                        account.id,
                        account.username,
                        account.email,
                        if account.active { "" } else { " [inactive]" }
                    );
                }
            }
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn verify_credentials(&self) -> io::Result<()> {
        let username = prompt("Username: ")?;
        let password = prompt("Password: ")?;

        match self.service.verify_credentials(&username, &password).await {
            Ok(Some(_)) => println!("Credentials valid"),
            Ok(None) => println!("Credentials invalid"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }

    async fn unlock_account(&self) -> io::Result<()> {
        let username = prompt("Username to unlock: ")?;

        let account = match self.service.get_by_username(&username).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                println!("Account not found");
                return Ok(());
            }
            Err(e) => {
                println!("Error: {e}");
                return Ok(());
            }
        };

        match self.service.reset_failed_attempts(&account.id).await {
            Ok(_) => println!("Failed-attempt counter reset, account unlocked"),
            Err(e) => println!("Error: {e}"),
        }

        Ok(())
    }
}

fn print_menu() {
    println!("\n=== ACCOUNT MENU ===");
    println!("1. Create account");
    println!("2. List active accounts");
    println!("3. Find account by username");
    println!("4. Update account email");
    println!("5. Deactivate account (logical delete)");
    println!("6. Delete account (physical delete)");
    println!("7. Login (with lockout)");
    println!("8. Change password");
    println!("9. List accounts paginated");
    println!("10. Verify credentials");
    println!("11. Unlock account (reset failed attempts)");
    println!("0. Quit");
}

fn print_account(account: &Account) {
    println!("Account found:");
    println!("   ID: {}", account.id);
    println!("   Username: {}", account.username);
    println!("   Email: {}", account.email);
    println!("   Active: {}", if account.active { "yes" } else { "no" });
    println!("   Locked: {}", if account.locked { "yes" } else { "no" });
    println!("   Failed attempts: {}", account.failed_attempts);
    println!("   Last login: {}", format_last_login(account));
}

fn format_last_login(account: &Account) -> String {
    account
        .last_login_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn parse_number(input: &str) -> Option<u32> {
    input.parse().ok()
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
