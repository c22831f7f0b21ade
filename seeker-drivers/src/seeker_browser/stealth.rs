use super::fingerprint::UserAgentProfile;
use seeker_common::StealthLevel;

/// Chromium command-line arguments for a stealth level and fingerprint.
pub fn build_stealth_arguments(level: StealthLevel, profile: &UserAgentProfile) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        format!("--lang={}", profile.languages.join(",")),
        format!("--window-size={},{}", profile.viewport.0, profile.viewport.1),
    ];
    if level != StealthLevel::Lightweight {
        args.push(format!("--user-agent={}", profile.user_agent));
    }
    if level == StealthLevel::Maximum {
        args.push("--disable-gpu".to_string());
        args.push("--disable-plugins-discovery".to_string());
    }
    args
}

/// JavaScript evasions applied after navigation in script-enabled contexts.
pub struct StealthScripts;

impl StealthScripts {
    pub fn core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en']
            });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }

    pub fn webgl_evasions() -> &'static str {
        r#"
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function(parameter) {
                if (parameter === 37445) return 'Intel Inc.';
                if (parameter === 37446) return 'Intel Iris OpenGL Engine';
                return getParameter.call(this, parameter);
            };
        "#
    }

    pub fn canvas_evasions() -> &'static str {
        r#"
            const getContext = HTMLCanvasElement.prototype.getContext;
            HTMLCanvasElement.prototype.getContext = function(type,...args){
                const ctx = getContext.call(this,type,...args);
                if(type==='2d' && ctx) {
                    const origToDataURL=this.toDataURL;
                    this.toDataURL=function(...a){
                        const imgdata=ctx.getImageData(0,0,this.width,this.height);
                        for(let i=0;i<imgdata.data.length;i+=4){
                            if(Math.random()<0.001)imgdata.data[i]+=Math.random()<0.5?-1:1;
                        }
                        ctx.putImageData(imgdata,0,0);
                        return origToDataURL.call(this,...a);
                    };
                }
                return ctx;
            };
        "#
    }

    /// Scripts to run for `level`, in order.
    pub fn for_level(level: StealthLevel, profile: &UserAgentProfile) -> Vec<String> {
        let mut scripts = vec![Self::core_evasions().to_string()];
        match level {
            StealthLevel::Lightweight => {}
            StealthLevel::Balanced => scripts.push(Self::canvas_evasions().to_string()),
            StealthLevel::Maximum => {
                scripts.push(Self::canvas_evasions().to_string());
                scripts.push(Self::webgl_evasions().to_string());
                scripts.push(format!(
                    "Object.defineProperty(navigator, 'platform', {{ get: () => '{}' }});",
                    profile.platform
                ));
            }
        }
        scripts
    }
}
