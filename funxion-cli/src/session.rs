use anyhow::{anyhow, bail, Result};
use funxion::{evaluate, Context, Function, Functions, Value};
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const PROMPT: &str = "fxn> ";

/// Variables and exit flag shared between the loop and the functions it exposes.
#[derive(Clone, Default)]
struct SessionState {
    vars: Arc<Mutex<Context>>,
    finished: Arc<AtomicBool>,
}

impl SessionState {
    fn new(vars: Context) -> Self {
        SessionState {
            vars: Arc::new(Mutex::new(vars)),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    fn snapshot(&self) -> Result<Context> {
        let vars = self
            .vars
            .lock()
            .map_err(|_| anyhow!("variable table is poisoned"))?;
        Ok(vars.clone())
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// `define(name, value)`, `delete(name)` and `exit()`.
    fn functions(&self) -> Functions {
        let mut functions = Functions::new();

        let vars = Arc::clone(&self.vars);
        let define: Function = Box::new(move |args: &[Value]| -> Result<Value> {
            match args {
                [Value::String(name), value] => {
                    let mut vars = vars.lock().map_err(|_| anyhow!("variable table is poisoned"))?;
                    vars.insert(name.clone(), value.clone());
                    Ok(Value::Bool(true))
                }
                _ => bail!("usage: define(\"name\", value)"),
            }
        });
        functions.insert("define".to_string(), define);

        let vars = Arc::clone(&self.vars);
        let delete: Function = Box::new(move |args: &[Value]| -> Result<Value> {
            match args {
                [Value::String(name)] => {
                    let mut vars = vars.lock().map_err(|_| anyhow!("variable table is poisoned"))?;
                    vars.remove(name);
                    Ok(Value::Bool(true))
                }
                _ => bail!("usage: delete(\"name\")"),
            }
        });
        functions.insert("delete".to_string(), delete);

        let finished = Arc::clone(&self.finished);
        let exit: Function = Box::new(move |_: &[Value]| -> Result<Value> {
            finished.store(true, Ordering::Relaxed);
            Ok(Value::Bool(true))
        });
        functions.insert("exit".to_string(), exit);

        functions
    }

    /// Evaluates one line against the current variables.
    fn evaluate_line(&self, line: &str, functions: &Functions) -> Result<Value> {
        let context = self.snapshot()?;
        Ok(evaluate(line, &context, functions)?)
    }
}

/// Reads expressions from stdin until it is closed or `exit()` is evaluated,
/// printing each result.
pub fn run(vars: Context) -> Result<()> {
    let state = SessionState::new(vars);
    let functions = state.functions();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    info!("reading expressions from stdin");
    prompt(&mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            match state.evaluate_line(line, &functions) {
                Ok(value) => println!("{}", value),
                Err(error) => eprintln!("error: {:#}", error),
            }
        }
        if state.is_finished() {
            debug!("exit() was called");
            break;
        }
        prompt(&mut stdout)?;
    }
    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> Result<()> {
    write!(stdout, "{}", PROMPT)?;
    stdout.flush()?;
    Ok(())
}
